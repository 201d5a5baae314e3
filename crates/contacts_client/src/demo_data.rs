//! Sample contacts shown to signed-out users.

use chrono::Utc;
use entities::Contact;

/// Builds the demo dataset, timestamped now.
pub fn demo_contacts() -> Vec<Contact> {
    let now = Utc::now();
    let contact = |id: &str, name: &str| Contact {
        id: id.to_string(),
        user_id: None,
        name: name.to_string(),
        email: None,
        phone: None,
        company: None,
        notes: None,
        last_contact: None,
        created_at: now,
        updated_at: now,
    };

    vec![
        Contact {
            email: Some("sarah.chen@example.com".to_string()),
            phone: Some("+1 (555) 123-4567".to_string()),
            company: Some("TechCorp Inc".to_string()),
            notes: Some("Met at conference. Interested in collaboration.".to_string()),
            ..contact("demo-1", "Sarah Chen")
        },
        Contact {
            email: Some("j.wilson@example.com".to_string()),
            company: Some("Design Studio".to_string()),
            notes: Some("Potential client for Q2".to_string()),
            ..contact("demo-2", "James Wilson")
        },
        Contact {
            phone: Some("+1 (555) 987-6543".to_string()),
            company: Some("Startup Labs".to_string()),
            notes: Some("Advisor, monthly check-ins".to_string()),
            ..contact("demo-3", "Maria Garcia")
        },
    ]
}
