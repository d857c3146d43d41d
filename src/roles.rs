//! Role and email derivation for manifest entries
//!
//! Both are pure functions of the username: roles come from a fixed
//! allow-list, emails from lowercasing plus the configured domain. Neither
//! value is ever stored back into the manifest.

/// Role assigned to a generated account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Player,
}

impl Role {
    /// The literal value interpolated into the generated SQL (`user_role` enum)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Player => "player",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin if the username appears in the allow-list (exact, case-sensitive
/// match), player otherwise.
pub fn role_for(username: &str, admin_usernames: &[String]) -> Role {
    if admin_usernames.iter().any(|a| a == username) {
        Role::Admin
    } else {
        Role::Player
    }
}

/// Derive the account email. Must stay in sync with the auth client's
/// `usernameToEmail` helper: `<lowercased username>@<domain>`.
pub fn derive_email(username: &str, email_domain: &str) -> String {
    format!("{}@{}", username.to_lowercase(), email_domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admins() -> Vec<String> {
        vec!["YLES-001".to_string(), "YLES-300".to_string()]
    }

    #[test]
    fn test_role_for_admin() {
        assert_eq!(role_for("YLES-001", &admins()), Role::Admin);
        assert_eq!(role_for("YLES-300", &admins()), Role::Admin);
    }

    #[test]
    fn test_role_for_player() {
        assert_eq!(role_for("YLES-002", &admins()), Role::Player);
        assert_eq!(role_for("YLES-299", &admins()), Role::Player);
    }

    #[test]
    fn test_role_allow_list_order_irrelevant() {
        let reversed = vec!["YLES-300".to_string(), "YLES-001".to_string()];
        assert_eq!(role_for("YLES-001", &reversed), Role::Admin);
        assert_eq!(role_for("YLES-002", &reversed), Role::Player);
    }

    #[test]
    fn test_role_match_is_case_sensitive() {
        // The allow-list matches the manifest casing exactly; only the email
        // is lowercased.
        assert_eq!(role_for("yles-001", &admins()), Role::Player);
    }

    #[test]
    fn test_derive_email_lowercases_username() {
        assert_eq!(derive_email("YLES-042", "example.app"), "yles-042@example.app");
        assert_eq!(derive_email("yles-042", "example.app"), "yles-042@example.app");
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Player.to_string(), "player");
    }
}
