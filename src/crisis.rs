use serde::Serialize;

use crate::config::CrisisRegion;

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "better off dead",
    "hurt myself",
    "self harm",
    "cut myself",
    "overdose",
    "hopeless",
    "no reason to live",
    "give up",
    "can't go on",
    "worthless",
    "burden",
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct EmergencyContact {
    pub number: &'static str,
    pub name: &'static str,
}

pub fn emergency_contact(region: CrisisRegion) -> EmergencyContact {
    match region {
        CrisisRegion::India => EmergencyContact {
            number: "9152987821",
            name: "Vandrevala Foundation (India)",
        },
        CrisisRegion::Us => EmergencyContact {
            number: "988",
            name: "Suicide & Crisis Lifeline (US)",
        },
        CrisisRegion::Uk => EmergencyContact {
            number: "116123",
            name: "Samaritans (UK)",
        },
        CrisisRegion::International => EmergencyContact {
            number: "+1-800-273-8255",
            name: "International Suicide Hotline",
        },
    }
}

/// Returns the first crisis phrase contained in `message`, ignoring case.
pub fn find_crisis_keyword(message: &str) -> Option<&'static str> {
    let lowered = message.to_lowercase();
    CRISIS_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
}

pub fn detect_crisis(message: &str) -> bool {
    find_crisis_keyword(message).is_some()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CrisisResponse {
    pub is_crisis: bool,
    pub message: String,
    pub emergency_contact: EmergencyContact,
}

pub fn crisis_response(region: CrisisRegion) -> CrisisResponse {
    let contact = emergency_contact(region);
    let message = format!(
        "I'm really concerned about what you just shared. Your life matters deeply, and there are \
people who want to help you through this difficult time.\n\n\
Please reach out to a professional who can provide immediate support:\n\n\
📞 {name}: {number}\n\n\
You don't have to face this alone. These trained counselors are available 24/7 and truly care \
about your wellbeing.\n\n\
Would you like to talk about what's troubling you? I'm here to listen, but please also consider \
calling the helpline above.",
        name = contact.name,
        number = contact.number,
    );

    CrisisResponse {
        is_crisis: true,
        message,
        emergency_contact: contact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_phrases_case_insensitively() {
        assert!(detect_crisis("Sometimes I feel HOPELESS about everything"));
        assert_eq!(
            find_crisis_keyword("I just want to give up today"),
            Some("give up")
        );
        assert!(detect_crisis("I can't go on like this"));
    }

    #[test]
    fn ordinary_messages_are_not_crises() {
        assert!(!detect_crisis("I had a long day at work but I'm okay"));
        assert!(!detect_crisis(""));
    }

    #[test]
    fn response_names_regional_contact() {
        let response = crisis_response(CrisisRegion::Us);
        assert!(response.is_crisis);
        assert_eq!(response.emergency_contact.number, "988");
        assert!(response
            .message
            .contains("\n📞 Suicide & Crisis Lifeline (US): 988\n"));
    }

    #[test]
    fn default_region_is_india() {
        let response = crisis_response(CrisisRegion::default());
        assert_eq!(response.emergency_contact.number, "9152987821");
    }
}
