//! DoggoNow Core - opening hours and venue records.
//!
//! Decides whether a dog-friendly venue is open at a given instant. Venue
//! hours are local `"HH:MM"` strings; the current instant is converted to
//! the venue's zone before comparison, overnight windows wrap past
//! midnight, and anything missing or malformed reads as closed.
//!
//! ```
//! use doggo_core::open_now::{EvaluationOptions, OpenNowEvaluator};
//!
//! let evaluator = OpenNowEvaluator::new(chrono_tz::America::Detroit, ["demo-venue"]);
//!
//! // Allowlisted venues are open even without hours
//! let options = EvaluationOptions::new().id("demo-venue");
//! assert!(evaluator.is_open_now(None, None, &options));
//!
//! // Missing hours are never open
//! assert!(!evaluator.is_open_now(Some("09:00"), None, &EvaluationOptions::new()));
//! ```

pub mod config;
pub mod distance;
pub mod hours;
pub mod open_now;
pub mod venue;
pub mod weekly;

pub use config::{ConfigError, EvaluatorConfig};
pub use distance::{haversine_miles, Coordinates, CoordinatesError};
pub use hours::{HoursError, OpeningWindow, TimeOfDay, WindowKind};
pub use open_now::{EvaluationOptions, OpenNowEvaluator, OpenStatus};
pub use venue::{load_venues, Venue, VenueError};
pub use weekly::{HoursRange, WeeklyHours, Weekday};
