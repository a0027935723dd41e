// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest installing a missing binary
    pub fn install_tool(tool: &str) -> Self {
        match tool {
            "kubectl" => Self {
                action: "Install kubectl".into(),
                steps: vec!["kubectl is required to talk to the Kubernetes cluster".into()],
                commands: vec![
                    "# Using gcloud:".into(),
                    "gcloud components install kubectl".into(),
                    "".into(),
                    "# Using Homebrew (macOS/Linux):".into(),
                    "brew install kubectl".into(),
                ],
            },
            "gcloud" => Self {
                action: "Install the Google Cloud SDK".into(),
                steps: vec![
                    "gcloud is required to configure the GCP service broker".into(),
                    "Follow https://cloud.google.com/sdk/docs/install".into(),
                ],
                commands: vec![],
            },
            "cfssl" | "cfssljson" => Self {
                action: format!("Install {}", tool),
                steps: vec![
                    "cfssl and cfssljson generate the Service Catalog TLS assets".into(),
                ],
                commands: vec![
                    "# Using Go:".into(),
                    "go install github.com/cloudflare/cfssl/cmd/cfssl@latest".into(),
                    "go install github.com/cloudflare/cfssl/cmd/cfssljson@latest".into(),
                ],
            },
            _ => Self {
                action: format!("Install {}", tool),
                steps: vec![format!("Install {} and ensure it's in your PATH", tool)],
                commands: vec![],
            },
        }
    }

    /// Suggest checking cluster access before retrying an install
    pub fn check_cluster_access() -> Self {
        Self {
            action: "Verify cluster access".into(),
            steps: vec![
                "sc assumes kubectl is configured to connect to the target cluster".into(),
            ],
            commands: vec![
                "kubectl config current-context".into(),
                "kubectl auth can-i create namespaces".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cfssl_tools_share_install_hint() {
        let cfssl = RecoverySuggestion::install_tool("cfssl");
        let json = RecoverySuggestion::install_tool("cfssljson");
        assert_eq!(cfssl.commands, json.commands);
        assert_eq!(json.action, "Install cfssljson");
    }

    #[test]
    fn test_display_lists_commands() {
        let text = RecoverySuggestion::install_tool("kubectl").to_string();
        assert!(text.starts_with("→ Install kubectl"));
        assert!(text.contains("brew install kubectl"));
    }
}
