use std::sync::Mutex;
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::error::WalletError;

/// Session behavior knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sliding inactivity window after which the unlocked key is purged.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// The unlocked wallet a caller gets back: address plus signing key. The key
/// is zeroized when this value drops.
pub struct ActiveWallet {
    pub address: String,
    private_key: Zeroizing<[u8; 32]>,
}

impl ActiveWallet {
    pub fn signing_key(&self) -> &[u8; 32] {
        &self.private_key
    }
}

struct Session {
    address: String,
    private_key: Zeroizing<[u8; 32]>,
    last_activity: Instant,
}

/// Holds at most one unlocked wallet, in memory only, behind a sliding
/// expiration window. Expiry is checked lazily on access; no background
/// timer exists, which keeps behavior deterministic under test.
pub struct SessionManager {
    session: Mutex<Option<Session>>,
    timeout: Duration,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: Mutex::new(None),
            timeout: config.timeout,
        }
    }

    /// Starts a session, replacing (and zeroizing) any existing one. Only
    /// one wallet is unlocked at a time.
    pub fn start(&self, address: String, private_key: Zeroizing<[u8; 32]>) {
        let mut slot = self.session.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Session {
            address,
            private_key,
            last_activity: Instant::now(),
        });
    }

    /// Slides the expiration window, or purges the session and fails
    /// `SessionExpired` if the window has already passed.
    pub fn touch(&self) -> Result<(), WalletError> {
        let mut slot = self.session.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_mut() {
            Some(session) if session.last_activity.elapsed() < self.timeout => {
                session.last_activity = Instant::now();
                Ok(())
            }
            Some(_) => {
                // Expired: drop the session, zeroizing the key.
                *slot = None;
                Err(WalletError::SessionExpired)
            }
            None => Err(WalletError::SessionExpired),
        }
    }

    /// Returns the active wallet if the session is alive, sliding the
    /// window; purges and fails `SessionExpired` otherwise.
    pub fn active_wallet(&self) -> Result<ActiveWallet, WalletError> {
        let mut slot = self.session.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_mut() {
            Some(session) if session.last_activity.elapsed() < self.timeout => {
                session.last_activity = Instant::now();
                Ok(ActiveWallet {
                    address: session.address.clone(),
                    private_key: session.private_key.clone(),
                })
            }
            Some(_) => {
                *slot = None;
                Err(WalletError::SessionExpired)
            }
            None => Err(WalletError::SessionExpired),
        }
    }

    /// Unconditionally purges the session and its key material.
    pub fn lock(&self) {
        let mut slot = self.session.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn manager_with_timeout(timeout: Duration) -> SessionManager {
        SessionManager::new(SessionConfig { timeout })
    }

    fn start_test_session(manager: &SessionManager) {
        manager.start(
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".into(),
            Zeroizing::new([0x11; 32]),
        );
    }

    #[test]
    fn active_wallet_within_window() {
        let manager = manager_with_timeout(Duration::from_secs(60));
        start_test_session(&manager);

        let active = manager.active_wallet().unwrap();
        assert_eq!(active.address, "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(active.signing_key(), &[0x11; 32]);
    }

    #[test]
    fn no_session_is_expired() {
        let manager = manager_with_timeout(Duration::from_secs(60));
        assert!(matches!(
            manager.active_wallet(),
            Err(WalletError::SessionExpired)
        ));
        assert!(matches!(manager.touch(), Err(WalletError::SessionExpired)));
    }

    #[test]
    fn session_expires_without_touch() {
        let manager = manager_with_timeout(Duration::from_millis(30));
        start_test_session(&manager);

        sleep(Duration::from_millis(50));
        assert!(matches!(
            manager.active_wallet(),
            Err(WalletError::SessionExpired)
        ));
        // Subsequent calls behave as logged out.
        assert!(matches!(
            manager.active_wallet(),
            Err(WalletError::SessionExpired)
        ));
    }

    #[test]
    fn touch_slides_the_window() {
        let manager = manager_with_timeout(Duration::from_millis(80));
        start_test_session(&manager);

        for _ in 0..4 {
            sleep(Duration::from_millis(40));
            manager.touch().expect("touched session must stay alive");
        }
        assert!(manager.active_wallet().is_ok());
    }

    #[test]
    fn lock_purges_unconditionally() {
        let manager = manager_with_timeout(Duration::from_secs(60));
        start_test_session(&manager);
        assert!(manager.active_wallet().is_ok());

        manager.lock();
        assert!(matches!(
            manager.active_wallet(),
            Err(WalletError::SessionExpired)
        ));
    }

    #[test]
    fn second_unlock_replaces_the_first() {
        let manager = manager_with_timeout(Duration::from_secs(60));
        start_test_session(&manager);

        manager.start(
            "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".into(),
            Zeroizing::new([0x22; 32]),
        );
        let active = manager.active_wallet().unwrap();
        assert_eq!(active.address, "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        assert_eq!(active.signing_key(), &[0x22; 32]);
    }
}
