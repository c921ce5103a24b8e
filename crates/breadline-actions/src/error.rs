//! Rejection reasons for participant actions.
//!
//! A rejection is never fatal. The `Display` text of each variant is the
//! message shown to the participant, and a rejected action leaves the
//! ledger untouched.

use breadline_types::{ContractStatus, District, SeatKind, Shortfall};

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The acting participant is not in the ledger.
    #[error("You are not known in the city")]
    UnknownParticipant,

    /// A referenced entity does not exist, or no longer does.
    #[error("That {what} no longer exists")]
    NotFound {
        /// Kind of entity.
        what: &'static str,
    },

    /// A numeric parameter is outside its legal range.
    #[error("{what} must be between {min} and {max}")]
    OutOfRange {
        /// Which parameter.
        what: &'static str,
        /// Smallest legal value.
        min: u32,
        /// Largest legal value.
        max: u32,
    },

    /// Not enough gold.
    #[error("You need {needed} gold but have {available}")]
    InsufficientGold {
        /// Gold required.
        needed: u32,
        /// Gold held.
        available: u32,
    },

    /// Not enough grain.
    #[error("You need {needed} sacks of grain but have {available}")]
    InsufficientGrain {
        /// Sacks required.
        needed: u32,
        /// Sacks held.
        available: u32,
    },

    /// The public stores cannot fill the order.
    #[error("The stores hold only {available} sacks")]
    StoresEmpty {
        /// Sacks in the stores.
        available: u32,
    },

    /// Another participant already holds the contract.
    #[error("Taken by {name}")]
    TakenBy {
        /// The holder's display name.
        name: String,
    },

    /// The contract is in the wrong state for this action.
    #[error("The contract is {status:?}")]
    WrongStatus {
        /// Its current state.
        status: ContractStatus,
    },

    /// The participant already holds an accepted contract.
    #[error("You already hold a contract")]
    AlreadyHoldingContract,

    /// The entity belongs to someone else.
    #[error("That is not yours")]
    NotYours,

    /// The participant is the subject of the action they attempted.
    #[error("You cannot target yourself")]
    SelfTarget,

    /// The daily completion cap was reached.
    #[error("You have finished all the work you can manage today")]
    DailyCap,

    /// A delivery was attempted too soon after the last one.
    #[error("Wait {secs}s before attempting another delivery")]
    DeliveryCooldown {
        /// Seconds left.
        secs: i64,
    },

    /// Only the named supplier may act on this supply contract.
    #[error("Only the named supplier can do that")]
    NotTheSupplier,

    /// The hunter's evidence is too weak to collect the bounty.
    #[error("You need evidence of strength {needed}; you hold {held}")]
    InsufficientEvidence {
        /// Strength required.
        needed: u32,
        /// Strength held.
        held: u32,
    },

    /// Smuggling is embargoed.
    #[error("The harbor is under embargo")]
    Embargo,

    /// The high-risk permit requirement blocks the action.
    #[error("A trade permit is required")]
    PermitRequired,

    /// The action belongs to a seat the participant does not hold.
    #[error("Only the {} can do that", .seat.title())]
    NotSeatHolder {
        /// The required seat.
        seat: SeatKind,
    },

    /// Intercepts need a seat or purchased access.
    #[error("You need a seat or purchased access")]
    NoAccess,

    /// Access was bought and has not lapsed.
    #[error("Your access has not lapsed yet")]
    AccessActive,

    /// The daily high-impact budget is spent.
    #[error("You have used all of today's high-impact actions")]
    HighImpactSpent,

    /// The participant is on the road.
    #[error("You are on the road")]
    Traveling,

    /// The action needs a particular district.
    #[error("You must be at {}", .district.label())]
    WrongDistrict {
        /// Where the action can be performed.
        district: District,
    },

    /// Travel to the current district.
    #[error("You are already there")]
    AlreadyThere,

    /// The ritual's protection is still in force.
    #[error("The ritual's protection is still upon you")]
    RitualActive,

    /// Text parameter is empty.
    #[error("Say something")]
    EmptyText,

    /// Text parameter is too long.
    #[error("Keep it under {max} characters")]
    TooLong {
        /// Character limit.
        max: usize,
    },

    /// Purchases are capped while the market is restricted.
    #[error("The market is restricted to {max} sacks per purchase")]
    MarketRestricted {
        /// Largest order allowed.
        max: u32,
    },

    /// The city is already building its maximum number of projects.
    #[error("The city cannot take on more projects")]
    ProjectLimit,

    /// The participant already funds a project under construction.
    #[error("You already have a project underway")]
    ProjectInProgress,

    /// No crisis is running.
    #[error("There is no crisis to respond to")]
    NoCrisis,

    /// The crisis already has all the help it needs.
    #[error("The crisis is already contained")]
    CrisisContained,

    /// A crisis response with nothing in it.
    #[error("Offer gold or grain")]
    NothingOffered,

    /// Repayment larger than the debt.
    #[error("Only {owed} gold is owed")]
    Overpayment {
        /// Outstanding amount.
        owed: u32,
    },

    /// The lender already has the maximum number of unanswered offers out.
    #[error("You already have {max} loan offers waiting for an answer")]
    TooManyOffers {
        /// Open offers allowed per lender.
        max: usize,
    },

    /// The lender no longer has the gold to fund the loan.
    #[error("The lender can no longer cover this loan")]
    LenderShort,

    /// The participant acted again inside the gateway cooldown.
    #[error("Slow down; wait a moment before acting again")]
    TooSoon,

    /// The loan or obligation is not in a state that allows this.
    #[error("That agreement is no longer open")]
    AgreementClosed,

    /// The evidence has gone stale.
    #[error("That evidence has gone stale")]
    Stale,
}

impl Rejection {
    /// Map a gold shortfall.
    pub const fn gold(shortfall: Shortfall) -> Self {
        Self::InsufficientGold {
            needed: shortfall.needed,
            available: shortfall.available,
        }
    }

    /// Map a grain shortfall.
    pub const fn grain(shortfall: Shortfall) -> Self {
        Self::InsufficientGrain {
            needed: shortfall.needed,
            available: shortfall.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let taken = Rejection::TakenBy {
            name: "Sly Miller".into(),
        };
        assert_eq!(taken.to_string(), "Taken by Sly Miller");
        let seat = Rejection::NotSeatHolder {
            seat: SeatKind::Treasurer,
        };
        assert_eq!(seat.to_string(), "Only the Treasurer can do that");
        let place = Rejection::WrongDistrict {
            district: District::Temple,
        };
        assert_eq!(place.to_string(), "You must be at the Temple");
    }
}
