//! Severity-tagged alerts on threshold crossings (spec §4.5.2). Observable
//! side effects only — routed through the Reconciler for logging, never
//! persisted as their own entity.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Positive,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

pub struct AlertInputs {
    pub top1_pct_concentration: f64,
    pub gini: f64,
    pub bot_ratio: f64,
    pub smart_money_ratio: f64,
    pub total_score: u32,
}

pub fn evaluate(inputs: &AlertInputs) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if inputs.top1_pct_concentration > 20.0 {
        alerts.push(Alert {
            severity: Severity::Critical,
            message: format!("top-1% concentration {:.1}% exceeds 20%", inputs.top1_pct_concentration),
        });
    }
    if inputs.gini > 0.9 {
        alerts.push(Alert { severity: Severity::Critical, message: format!("gini {:.3} exceeds 0.9", inputs.gini) });
    }
    if inputs.bot_ratio > 0.5 {
        alerts.push(Alert {
            severity: Severity::Warning,
            message: format!("bot ratio {:.1}% exceeds 50%", inputs.bot_ratio * 100.0),
        });
    }
    if inputs.smart_money_ratio > 0.1 {
        alerts.push(Alert {
            severity: Severity::Info,
            message: format!("smart-money ratio {:.1}% exceeds 10%", inputs.smart_money_ratio * 100.0),
        });
    }
    if inputs.total_score > 250 {
        alerts.push(Alert {
            severity: Severity::Positive,
            message: format!("holder score {} exceeds 250", inputs.total_score),
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_concentration_and_gini_are_critical() {
        let inputs = AlertInputs {
            top1_pct_concentration: 25.0,
            gini: 0.95,
            bot_ratio: 0.0,
            smart_money_ratio: 0.0,
            total_score: 0,
        };
        let alerts = evaluate(&inputs);
        assert_eq!(alerts.iter().filter(|a| a.severity == Severity::Critical).count(), 2);
    }

    #[test]
    fn clean_token_has_no_alerts() {
        let inputs = AlertInputs {
            top1_pct_concentration: 5.0,
            gini: 0.3,
            bot_ratio: 0.1,
            smart_money_ratio: 0.02,
            total_score: 150,
        };
        assert!(evaluate(&inputs).is_empty());
    }
}
