//! Checkout and mock payment.
//!
//! Collects contact and card details for a completed booking, validates them
//! locally, waits out a simulated processing delay and shows a confirmation.
//! Nothing is charged.

use crate::error::CheckoutError;
use crate::types::{BookingData, FlowId, OrderSummary};
use chrono::{DateTime, Utc};
use marquee_core::environment::Clock;
use marquee_core::{async_effect, delay, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Simulated payment processing time
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(1500);

const CARD_DIGITS: usize = 16;
const MIN_CVV_DIGITS: usize = 3;

// ============================================================================
// Payment form
// ============================================================================

/// A field of the payment form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Email the tickets go to
    Email,
    /// Phone
    Phone,
    /// Card number, grouped in fours
    CardNumber,
    /// Expiry, `MM/YY`
    ExpiryDate,
    /// Card verification value
    Cvv,
    /// Billing ZIP code
    BillingZip,
}

impl FormField {
    /// Every field, in form order
    pub const ALL: [Self; 8] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
        Self::BillingZip,
    ];

    /// Human-readable name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::CardNumber => "card number",
            Self::ExpiryDate => "expiry date",
            Self::Cvv => "CVV",
            Self::BillingZip => "billing ZIP code",
        }
    }

    /// Short name used on the command line
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstName => "first",
            Self::LastName => "last",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::CardNumber => "card",
            Self::ExpiryDate => "expiry",
            Self::Cvv => "cvv",
            Self::BillingZip => "zip",
        }
    }

    /// Field for a command-line key, case-insensitive
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

/// Keep at most 16 digits, grouped in fours
#[must_use]
pub fn format_card_number(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).take(CARD_DIGITS).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep at most 4 digits, rendered `MM/YY` once the month is complete
#[must_use]
pub fn format_expiry(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() >= 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Keep at most 4 digits
#[must_use]
pub fn format_cvv(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(4).collect()
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

/// Contact and card details
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentForm {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    card_number: String,
    expiry_date: String,
    cvv: String,
    billing_zip: String,
}

impl PaymentForm {
    /// Current value of a field
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::CardNumber => &self.card_number,
            FormField::ExpiryDate => &self.expiry_date,
            FormField::Cvv => &self.cvv,
            FormField::BillingZip => &self.billing_zip,
        }
    }

    /// Store a field, normalizing card, expiry and CVV input
    pub fn set(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::CardNumber => &mut self.card_number,
            FormField::ExpiryDate => &mut self.expiry_date,
            FormField::Cvv => &mut self.cvv,
            FormField::BillingZip => &mut self.billing_zip,
        };
        *slot = match field {
            FormField::CardNumber => format_card_number(value),
            FormField::ExpiryDate => format_expiry(value),
            FormField::Cvv => format_cvv(value),
            _ => value.trim().to_string(),
        };
    }

    /// Fields that would block submission, in form order
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| {
                let value = self.get(*field);
                match field {
                    FormField::CardNumber => digit_count(value) < CARD_DIGITS,
                    FormField::Cvv => digit_count(value) < MIN_CVV_DIGITS,
                    _ => value.trim().is_empty(),
                }
            })
            .collect()
    }

    /// Whether the form can be submitted
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.invalid_fields().is_empty()
    }
}

// ============================================================================
// State
// ============================================================================

/// Where checkout is
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Filling in the form
    Payment,
    /// Waiting for the simulated payment
    Processing,
    /// Payment accepted
    Confirmation {
        /// When the payment settled
        confirmed_at: DateTime<Utc>,
        /// Address the tickets were sent to
        sent_to: String,
    },
}

/// State of one checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutState {
    /// What is being bought
    pub booking: BookingData,
    /// Price breakdown
    pub summary: OrderSummary,
    /// Form contents
    pub form: PaymentForm,
    /// Current step
    pub step: CheckoutStep,
    /// Most recent rejection, cleared by the next accepted action
    pub last_error: Option<CheckoutError>,
    /// Flow this checkout belongs to
    pub flow: FlowId,
}

impl CheckoutState {
    /// Start checkout for a booking
    #[must_use]
    pub fn new(booking: BookingData) -> Self {
        let summary = OrderSummary::for_booking(&booking);
        Self {
            booking,
            summary,
            form: PaymentForm::default(),
            step: CheckoutStep::Payment,
            last_error: None,
            flow: FlowId::default(),
        }
    }

    /// Tag the checkout with the flow that owns it
    #[must_use]
    pub fn with_flow(mut self, flow: FlowId) -> Self {
        self.flow = flow;
        self
    }

    /// Whether the payment has settled
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self.step, CheckoutStep::Confirmation { .. })
    }

    /// Label of the submit button
    #[must_use]
    pub fn submit_label(&self) -> String {
        format!("Complete Purchase - {}", self.summary.total)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs to checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Type into a field
    UpdateField {
        /// Field edited
        field: FormField,
        /// Raw input
        value: String,
    },
    /// Submit the form
    Submit,
    /// Feedback: the simulated payment went through
    PaymentSettled {
        /// Flow whose payment settled
        flow: FlowId,
    },
    /// Leave the confirmation screen
    Finish,
    /// Feedback: checkout is over
    CheckoutCompleted {
        /// Flow that finished
        flow: FlowId,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the checkout reducer
#[derive(Clone)]
pub struct CheckoutEnvironment {
    /// Stamps confirmations
    pub clock: Arc<dyn Clock>,
    /// Simulated processing time
    pub payment_delay: Duration,
}

impl CheckoutEnvironment {
    /// Create an environment
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, payment_delay: Duration) -> Self {
        Self {
            clock,
            payment_delay,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for checkout
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckoutReducer;

impl CheckoutReducer {
    fn reject(state: &mut CheckoutState, error: CheckoutError) {
        warn!(event_id = %state.booking.event.id, %error, "Checkout action rejected");
        state.last_error = Some(error);
    }

    fn ensure_editable(state: &CheckoutState) -> Result<(), CheckoutError> {
        match state.step {
            CheckoutStep::Payment => Ok(()),
            CheckoutStep::Processing => Err(CheckoutError::PaymentInProgress {
                state: "processing",
            }),
            CheckoutStep::Confirmation { .. } => Err(CheckoutError::PaymentInProgress {
                state: "complete",
            }),
        }
    }
}

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::UpdateField { field, value } => {
                if let Err(error) = Self::ensure_editable(state) {
                    Self::reject(state, error);
                    return SmallVec::new();
                }
                state.form.set(field, &value);
                state.last_error = None;
            },

            CheckoutAction::Submit => {
                if let Err(error) = Self::ensure_editable(state) {
                    Self::reject(state, error);
                    return SmallVec::new();
                }
                let fields = state.form.invalid_fields();
                if !fields.is_empty() {
                    Self::reject(state, CheckoutError::InvalidForm { fields });
                    return SmallVec::new();
                }

                info!(
                    event_id = %state.booking.event.id,
                    total = %state.summary.total,
                    delay_ms = env.payment_delay.as_millis(),
                    "Payment submitted"
                );
                state.step = CheckoutStep::Processing;
                state.last_error = None;

                return smallvec![delay! {
                    duration: env.payment_delay,
                    action: CheckoutAction::PaymentSettled { flow: state.flow }
                }];
            },

            CheckoutAction::PaymentSettled { flow } => {
                if flow != state.flow {
                    debug!(%flow, current = %state.flow, "Ignoring payment settlement from another flow");
                    return SmallVec::new();
                }
                if state.step != CheckoutStep::Processing {
                    debug!("Ignoring payment settlement outside processing");
                    return SmallVec::new();
                }
                let confirmed_at = env.clock.now();
                info!(
                    event_id = %state.booking.event.id,
                    seats = %state.booking.seat_list(),
                    total = %state.summary.total,
                    %confirmed_at,
                    "Booking confirmed"
                );
                state.step = CheckoutStep::Confirmation {
                    confirmed_at,
                    sent_to: state.form.get(FormField::Email).to_string(),
                };
            },

            CheckoutAction::Finish => {
                if !state.is_confirmed() {
                    Self::reject(state, CheckoutError::NotConfirmed);
                    return SmallVec::new();
                }
                state.last_error = None;
                let flow = state.flow;
                return smallvec![async_effect! { Some(CheckoutAction::CheckoutCompleted { flow }) }];
            },

            CheckoutAction::CheckoutCompleted { flow } => {
                debug!(%flow, event_id = %state.booking.event.id, "Checkout handed back");
            },
        }

        SmallVec::new()
    }
}
