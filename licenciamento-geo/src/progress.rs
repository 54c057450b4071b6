//! Affichage de la progression d'un calcul externe
//!
//! L'état est entièrement piloté par l'appelant : pas de minuterie, pas
//! d'estimation, et la dernière écriture gagne (aucune monotonie imposée).

use serde::Serialize;
use tracing::debug;

/// État affiché
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ProgressState {
    /// Rien n'est affiché
    #[default]
    Idle,
    /// Calcul en cours : étape et pourcentage fournis par l'appelant
    Running { step: String, percent: u8 },
    /// Terminé avec succès (jusqu'à `reset`)
    Success,
    /// Terminé en erreur
    Error { message: String },
}

/// Rapporteur de progression
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    state: ProgressState,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace l'état courant, quel qu'il soit ; le pourcentage est borné à 100
    pub fn report(&mut self, state: ProgressState) {
        let state = match state {
            ProgressState::Running { step, percent } => ProgressState::Running {
                step,
                percent: percent.min(100),
            },
            other => other,
        };
        debug!(from = ?self.state, to = ?state, "Progress transition");
        self.state = state;
    }

    /// Passe en cours de calcul
    pub fn running(&mut self, step: impl Into<String>, percent: u8) {
        self.report(ProgressState::Running {
            step: step.into(),
            percent,
        });
    }

    pub fn succeed(&mut self) {
        self.report(ProgressState::Success);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.report(ProgressState::Error {
            message: message.into(),
        });
    }

    pub fn reset(&mut self) {
        self.report(ProgressState::Idle);
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != ProgressState::Idle
    }

    /// Texte affiché ; `None` au repos
    pub fn render(&self) -> Option<String> {
        match &self.state {
            ProgressState::Idle => None,
            ProgressState::Running { step, percent } => Some(format!(
                "Calculando Zona de Amortecimento\n{}\n[{}] {}%",
                step,
                progress_bar(*percent, 20),
                percent
            )),
            ProgressState::Success => Some(
                "Cálculo Concluído!\nA zona de amortecimento foi calculada com sucesso.".to_string(),
            ),
            ProgressState::Error { message } => Some(format!("Erro no Cálculo\n{}", message)),
        }
    }
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent) * width / 100).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_renders_nothing() {
        let reporter = ProgressReporter::new();
        assert_eq!(reporter.state(), &ProgressState::Idle);
        assert!(!reporter.is_visible());
        assert!(reporter.render().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut reporter = ProgressReporter::new();
        reporter.running("Gerando buffer", 50);
        reporter.succeed();
        reporter.running("Recomeçando", 10);

        assert_eq!(
            reporter.state(),
            &ProgressState::Running {
                step: "Recomeçando".to_string(),
                percent: 10
            }
        );
    }

    #[test]
    fn test_percent_is_clamped() {
        let mut reporter = ProgressReporter::new();
        reporter.running("x", 250);
        assert!(matches!(reporter.state(), ProgressState::Running { percent: 100, .. }));
    }

    #[test]
    fn test_report_clamps_percent_before_render() {
        let mut reporter = ProgressReporter::new();
        reporter.report(ProgressState::Running {
            step: "x".to_string(),
            percent: 150,
        });
        assert!(matches!(reporter.state(), ProgressState::Running { percent: 100, .. }));
        assert!(reporter.render().unwrap().ends_with("[####################] 100%"));
        assert_eq!(progress_bar(u8::MAX, 20), "#".repeat(20));
    }

    #[test]
    fn test_render_states() {
        let mut reporter = ProgressReporter::new();
        reporter.running("Subtraindo referência", 40);
        let text = reporter.render().unwrap();
        assert!(text.contains("Subtraindo referência"));
        assert!(text.contains("[########------------] 40%"));

        reporter.fail("Camada inválida: sem features.");
        assert!(reporter.render().unwrap().ends_with("Camada inválida: sem features."));

        reporter.succeed();
        assert!(reporter.render().unwrap().starts_with("Cálculo Concluído!"));

        reporter.reset();
        assert!(reporter.render().is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ProgressState::Running {
            step: "a".to_string(),
            percent: 5,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "running", "step": "a", "percent": 5}));
    }
}
