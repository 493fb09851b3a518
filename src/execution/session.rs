use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{BrokerSession, ConnectionStatus};
use crate::Result;

/// Credential rules checked on connect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialPolicy {
    pub supported_domains: Vec<String>,
    pub min_secret_length: usize,
    pub max_secret_length: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            supported_domains: vec!["gmail.com".to_string()],
            min_secret_length: 8,
            max_secret_length: 128,
        }
    }
}

impl CredentialPolicy {
    /// Account must be `local@domain` with a supported domain
    pub fn check_account(&self, account: &str) -> Result<()> {
        let account = account.trim();
        let (local, domain) = account
            .split_once('@')
            .ok_or_else(|| Error::validation("account must be an email address"))?;

        if domain.is_empty() || domain.contains('@') || !is_valid_local_part(local) {
            return Err(Error::validation("account must be an email address"));
        }

        let supported = self
            .supported_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(domain));
        if !supported {
            return Err(Error::validation(format!(
                "only {} accounts are supported",
                self.supported_domains.join(", ")
            )));
        }

        Ok(())
    }

    pub fn check_secret(&self, secret: &str) -> Result<()> {
        let len = secret.trim().chars().count();
        if len < self.min_secret_length {
            return Err(Error::validation(format!(
                "secret must have at least {} characters",
                self.min_secret_length
            )));
        }
        if secret.chars().count() > self.max_secret_length {
            return Err(Error::validation(format!(
                "secret must have at most {} characters",
                self.max_secret_length
            )));
        }
        Ok(())
    }
}

/// Dot-separated runs of RFC 5322 `atext`; no quoting, no empty runs
fn is_valid_local_part(local: &str) -> bool {
    const SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

    !local.is_empty()
        && local.split('.').all(|atom| {
            !atom.is_empty()
                && atom
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c))
        })
}

/// Owns the single broker session and gates every order mutation on it
pub struct SessionGuard {
    session: BrokerSession,
    policy: CredentialPolicy,
}

impl SessionGuard {
    pub fn new(policy: CredentialPolicy) -> Self {
        Self {
            session: BrokerSession::default(),
            policy,
        }
    }

    pub fn session(&self) -> &BrokerSession {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.status == ConnectionStatus::Connected
    }

    pub fn connect(&mut self, account: &str, secret: &str) -> Result<&BrokerSession> {
        self.connect_at(account, secret, Utc::now())
    }

    /// Validate credentials and open a fresh session stamped at `now`
    pub fn connect_at(
        &mut self,
        account: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<&BrokerSession> {
        if let Err(e) = self
            .policy
            .check_account(account)
            .and_then(|_| self.policy.check_secret(secret))
        {
            tracing::warn!("Connection attempt rejected: {}", e);
            return Err(e);
        }

        self.session = BrokerSession {
            status: ConnectionStatus::Connected,
            account: Some(account.trim().to_string()),
            connected_at: Some(now),
        };
        tracing::info!("Connected to broker as {}", account.trim());

        Ok(&self.session)
    }

    /// Always succeeds, whatever the current state
    pub fn disconnect(&mut self) -> &BrokerSession {
        if self.is_connected() {
            tracing::info!("Disconnected from broker");
        }
        self.session.status = ConnectionStatus::Disconnected;
        &self.session
    }

    pub fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(CredentialPolicy::default())
    }
}
