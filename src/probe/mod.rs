//! End-to-end probes against the live backend
//!
//! Each probe runs a fixed sequence of requests, prints what happened, and
//! returns a [`ProbeReport`] of the steps it attempted.

pub mod fcm;
pub mod message;

use std::fmt;

use crate::error::ProbeError;

/// A single request (or lookup) within a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LookupFcmToken,
    SendFcm,
    WriteMessage,
    LookupPlayer,
    SendOneSignal,
    UpdateConversation,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::LookupFcmToken => "look up FCM token",
            Step::SendFcm => "send FCM notification",
            Step::WriteMessage => "write message",
            Step::LookupPlayer => "look up OneSignal player",
            Step::SendOneSignal => "send OneSignal notification",
            Step::UpdateConversation => "update conversation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
}

/// Steps a probe attempted, in order.
#[derive(Debug, Default)]
pub struct ProbeReport {
    steps: Vec<(Step, Outcome)>,
}

impl ProbeReport {
    fn record(&mut self, step: Step, outcome: Outcome) {
        tracing::debug!("{}: {:?}", step, outcome);
        self.steps.push((step, outcome));
    }

    /// Record a step result, printing the failure if there was one.
    fn track<T>(&mut self, step: Step, result: Result<T, ProbeError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.record(step, Outcome::Ok);
                Some(v)
            }
            Err(e) => {
                print_failure(step, &e);
                self.record(step, Outcome::Failed);
                None
            }
        }
    }

    #[cfg(test)]
    pub fn from_steps(steps: Vec<(Step, Outcome)>) -> Self {
        Self { steps }
    }

    /// Outcome of a step, or `None` if it never ran.
    #[cfg(test)]
    pub fn outcome(&self, step: Step) -> Option<Outcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, o)| *o)
    }

    #[cfg(test)]
    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.steps.iter().map(|(s, _)| *s)
    }

    pub fn failed(&self) -> impl Iterator<Item = Step> + '_ {
        self.steps
            .iter()
            .filter(|(_, o)| *o == Outcome::Failed)
            .map(|(s, _)| *s)
    }

    /// True when every attempted step went through.
    pub fn succeeded(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|(_, o)| *o == Outcome::Ok)
    }
}

fn print_failure(step: Step, err: &ProbeError) {
    if let Some(status) = err.status() {
        println!("Failed to {}: {}", step, status);
    } else {
        print_detail(step, err);
    }
    if let Some(body) = err.response_body() {
        println!("   Response: {}", body);
    }
}

fn print_detail(step: Step, err: &ProbeError) {
    match err {
        ProbeError::MissingField { field, .. } => {
            println!("Failed to {}: no '{}' in user document", step, field)
        }
        ProbeError::NoPlayer(_) => {
            println!("Failed to {}: no OneSignal player found", step);
            println!("   The recipient needs to open the app once to register with OneSignal");
        }
        other => println!("Failed to {}: {}", step, other),
    }
}

fn banner(title: &str) {
    println!("\n{:=<60}", "");
    println!("{}", title);
    println!("{:=<60}", "");
}

/// First `n` characters of a token, for display.
fn preview(s: &str, n: usize) -> String {
    let head: String = s.chars().take(n).collect();
    if head.len() < s.len() {
        format!("{}...", head)
    } else {
        head
    }
}
