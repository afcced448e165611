// ============================================================================
// UTIL : CODE COUNTDOWN
// ============================================================================
//
// Description:
//   Compte à rebours d'un code 2FA (120 secondes), modélisé comme un objet
//   d'état explicite au lieu de timers globaux implicites. L'appelant pilote
//   le temps en appelant tick() une fois par seconde.
//
//   Événements émis:
//     - Tick(remaining) : une seconde est passée
//     - Warning(remaining) : émis UNE fois quand on passe sous le seuil
//     - Expired : émis UNE fois quand le compte atteint zéro
//
// Points d'attention:
//   - L'expiration locale n'appelle pas le réseau : le serveur re-vérifie
//     l'expiration à la vérification du code, et c'est lui qui fait foi
//   - cancel() invalide le timer : plus aucun événement après (le compteur
//     de génération permet d'ignorer un callback d'un cycle précédent)
//   - restart() modélise l'action "resend" : nouveau cycle à 120s
//
// ============================================================================

pub const CODE_TTL_SECONDS: u32 = 120;
pub const WARNING_THRESHOLD_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick(u32),
    Warning(u32),
    Expired,
}

#[derive(Debug)]
pub struct CodeCountdown {
    remaining: u32,
    generation: u64,
    warning_fired: bool,
    expired: bool,
    cancelled: bool,
}

impl CodeCountdown {
    pub fn new() -> Self {
        Self {
            remaining: CODE_TTL_SECONDS,
            generation: 0,
            warning_fired: false,
            expired: false,
            cancelled: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Identifie le cycle courant : un callback portant une génération
    /// périmée doit être ignoré par l'appelant.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Avance d'une seconde. Retourne None si le timer est annulé ou
    /// déjà expiré (Expired n'est jamais émis deux fois).
    pub fn tick(&mut self) -> Option<CountdownEvent> {
        if self.cancelled || self.expired {
            return None;
        }

        self.remaining -= 1;

        if self.remaining == 0 {
            self.expired = true;
            return Some(CountdownEvent::Expired);
        }

        if self.remaining <= WARNING_THRESHOLD_SECONDS && !self.warning_fired {
            self.warning_fired = true;
            return Some(CountdownEvent::Warning(self.remaining));
        }

        Some(CountdownEvent::Tick(self.remaining))
    }

    /// Annule le timer (équivalent cancel-on-unmount)
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.generation += 1;
    }

    /// Action "resend" : un nouveau code vient d'être émis, le compte
    /// repart à 120s et le code saisi précédemment devient périmé.
    /// Retourne la nouvelle génération.
    pub fn restart(&mut self) -> u64 {
        self.generation += 1;
        self.remaining = CODE_TTL_SECONDS;
        self.warning_fired = false;
        self.expired = false;
        self.cancelled = false;
        self.generation
    }
}

impl Default for CodeCountdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_expiry_before_120_ticks() {
        let mut countdown = CodeCountdown::new();
        let mut expiries = 0;

        for _ in 0..118 {
            if countdown.tick() == Some(CountdownEvent::Expired) {
                expiries += 1;
            }
        }

        assert_eq!(countdown.remaining(), 2);
        assert_eq!(expiries, 0);
        assert!(!countdown.is_expired());
    }

    #[test]
    fn test_expiry_fires_exactly_once_at_120_ticks() {
        let mut countdown = CodeCountdown::new();
        let mut expiries = 0;

        for _ in 0..125 {
            if countdown.tick() == Some(CountdownEvent::Expired) {
                expiries += 1;
            }
        }

        assert_eq!(expiries, 1);
        assert!(countdown.is_expired());
        // Un timer expiré n'émet plus rien
        assert_eq!(countdown.tick(), None);
    }

    #[test]
    fn test_warning_fires_once_at_threshold() {
        let mut countdown = CodeCountdown::new();
        let mut warnings = Vec::new();

        for _ in 0..119 {
            if let Some(CountdownEvent::Warning(remaining)) = countdown.tick() {
                warnings.push(remaining);
            }
        }

        assert_eq!(warnings, vec![WARNING_THRESHOLD_SECONDS]);
    }

    #[test]
    fn test_cancel_suppresses_all_events() {
        let mut countdown = CodeCountdown::new();
        let generation_before = countdown.generation();

        countdown.tick();
        countdown.cancel();

        assert!(countdown.generation() > generation_before);
        for _ in 0..200 {
            assert_eq!(countdown.tick(), None);
        }
        assert!(!countdown.is_expired());
    }

    #[test]
    fn test_restart_begins_fresh_cycle() {
        let mut countdown = CodeCountdown::new();

        for _ in 0..120 {
            countdown.tick();
        }
        assert!(countdown.is_expired());

        let new_generation = countdown.restart();
        assert_eq!(countdown.remaining(), CODE_TTL_SECONDS);
        assert!(!countdown.is_expired());
        assert_eq!(new_generation, countdown.generation());

        // Le warning doit pouvoir se ré-émettre dans le nouveau cycle
        let mut warnings = 0;
        for _ in 0..119 {
            if let Some(CountdownEvent::Warning(_)) = countdown.tick() {
                warnings += 1;
            }
        }
        assert_eq!(warnings, 1);
    }
}
