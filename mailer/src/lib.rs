//! Digest rendering and delivery.
//!
//! [`digest`] turns a run's listings into an HTML document, [`message`]
//! wraps it into an RFC 2822 email, and a [`Mailer`] ships it. The only
//! production mailer is [`gmail::GmailMailer`]; anything that can send one
//! HTML message to one address can implement the trait.

pub mod digest;
pub mod error;
pub mod gmail;
pub mod message;
pub mod oauth;

pub use digest::Digest;
pub use error::{DeliveryError, Result};
pub use gmail::GmailMailer;
pub use message::EmailMessage;

/// A transactional mail capability.
pub trait Mailer {
    fn send(&mut self, message: &EmailMessage) -> Result<()>;
}
