//! Context composer - renders matched threats as prompt grounding

use crate::models::Threat;

/// Numbered blocks in input order, separated by a blank line
pub fn compose(threats: &[Threat]) -> String {
    threats
        .iter()
        .enumerate()
        .map(|(index, threat)| {
            format!(
                "Threat {}\nThreat Name: {}\nDescription: {}\nTags: {}",
                index + 1,
                threat.name,
                threat.description,
                threat.tags.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn threat(name: &str, description: &str, tags: &[&str]) -> Threat {
        Threat {
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compose_numbers_in_order() {
        let context = compose(&[
            threat("Volt Typhoon", "PRC actor", &["volt-typhoon", "state-actor"]),
            threat("LockBit", "Ransomware", &[]),
        ]);

        assert_eq!(
            context,
            "Threat 1\nThreat Name: Volt Typhoon\nDescription: PRC actor\nTags: volt-typhoon, state-actor\n\n\
             Threat 2\nThreat Name: LockBit\nDescription: Ransomware\nTags: "
        );
    }

    #[test]
    fn test_compose_empty() {
        assert_eq!(compose(&[]), "");
    }
}
