//! Coin economy.
//!
//! Coins never go negative. Costs are checked at the moment they are paid,
//! and a card's declared shortfall policy decides what an unaffordable
//! cost does.

use serde::{Deserialize, Serialize};

/// What a `LoseCoins` step does when the player cannot pay in full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortfall {
    /// Pay nothing and carry on with the next step.
    #[default]
    SkipStep,
    /// Pay nothing and abandon the rest of the script.
    SkipRest,
    /// Pay everything the player has.
    PayWhatYouCan,
}

/// Result of attempting a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payment {
    /// The full amount was paid.
    Paid(u32),
    /// Only part of the amount was paid (`PayWhatYouCan`).
    Partial(u32),
    /// Nothing was paid; carry on.
    Skipped,
    /// Nothing was paid; stop the script.
    Abort,
}

/// Coin arithmetic over a player's purse.
pub struct Economy;

impl Economy {
    pub fn gain(coins: &mut u32, amount: u32) {
        *coins = coins.saturating_add(amount);
    }

    /// Try to pay `amount` under the given shortfall policy.
    pub fn pay(coins: &mut u32, amount: u32, shortfall: Shortfall) -> Payment {
        if *coins >= amount {
            *coins -= amount;
            return Payment::Paid(amount);
        }
        match shortfall {
            Shortfall::SkipStep => Payment::Skipped,
            Shortfall::SkipRest => Payment::Abort,
            Shortfall::PayWhatYouCan => {
                let paid = *coins;
                *coins = 0;
                Payment::Partial(paid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affordable_payment() {
        let mut coins = 5;
        assert_eq!(Economy::pay(&mut coins, 4, Shortfall::SkipRest), Payment::Paid(4));
        assert_eq!(coins, 1);
    }

    #[test]
    fn test_shortfall_policies() {
        let mut coins = 3;
        assert_eq!(Economy::pay(&mut coins, 4, Shortfall::SkipStep), Payment::Skipped);
        assert_eq!(coins, 3);

        assert_eq!(Economy::pay(&mut coins, 4, Shortfall::SkipRest), Payment::Abort);
        assert_eq!(coins, 3);

        assert_eq!(Economy::pay(&mut coins, 4, Shortfall::PayWhatYouCan), Payment::Partial(3));
        assert_eq!(coins, 0);
    }

    #[test]
    fn test_gain_saturates() {
        let mut coins = u32::MAX - 1;
        Economy::gain(&mut coins, 5);
        assert_eq!(coins, u32::MAX);
    }
}
