//! Client side of waitlist onboarding: the per-step validators, the form
//! model, the state machine that walks a user through the steps, and an
//! HTTP implementation of the gateway it saves through.

pub mod client;
pub mod flow;
pub mod form;
pub mod step;
pub mod validation;
