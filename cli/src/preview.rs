//! Conversion quotes for an arbitrary vault state.

use serde::Serialize;

use vault_protocol::conversion::{assets_to_shares, shares_to_assets};
use vault_protocol::{Amount, Operation, Rounding, VaultState};

/// One quoted conversion. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub name: String,
    pub rounding: Rounding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Quote {
    fn new<E: std::fmt::Display>(
        name: impl Into<String>,
        rounding: Rounding,
        outcome: Result<Amount, E>,
    ) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            name: name.into(),
            rounding,
            result,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub state: VaultState,
    pub amount: Amount,
    pub quotes: Vec<Quote>,
}

impl PreviewReport {
    /// Quotes every operation's preview and both fair-value conversions of
    /// `amount` against `state`.
    pub fn compute(state: VaultState, amount: Amount) -> Self {
        let mut quotes: Vec<Quote> = Operation::ALL
            .iter()
            .map(|op| {
                Quote::new(
                    format!("preview_{op}"),
                    op.rounding(),
                    op.quote(amount, state),
                )
            })
            .collect();
        quotes.push(Quote::new(
            "convert_to_shares",
            Rounding::Down,
            assets_to_shares(amount, state, Rounding::Down),
        ));
        quotes.push(Quote::new(
            "convert_to_assets",
            Rounding::Down,
            shares_to_assets(amount, state, Rounding::Down),
        ));

        tracing::debug!(
            total_assets = state.total_assets,
            total_shares = state.total_shares,
            amount,
            "computed preview report"
        );
        Self {
            state,
            amount,
            quotes,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.name == name)
    }
}
