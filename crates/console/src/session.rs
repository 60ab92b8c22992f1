//! Live meet-control session: operator commands on stdin, timers ticked once
//! per second in the background.

use anyhow::{Context, Result, anyhow, bail};
use engine::models::{AttemptResult, Entry, EntryId, Lift, SessionKey};
use engine::{AttemptStateMachine, Clock, EngineError, MeetConfig};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::commands::{bar_load, render_order, render_stack};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Declare { lifter: String, lift: Lift, attempt: u8, weight: Decimal },
    Mark { lifter: String, lift: Lift, attempt: u8, result: AttemptResult },
    Reopen { lifter: String, lift: Lift, attempt: u8 },
    Clear { lifter: String, lift: Lift, attempt: u8 },
    Order { lift: Lift, attempt: u8 },
    Status { lifter: String },
    Bar { lift: Lift, weight: Decimal, previous: Option<Decimal> },
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            bail!("empty command");
        };

        let command = match (verb.to_lowercase().as_str(), args) {
            ("declare", [lifter, lift, attempt, weight]) => Command::Declare {
                lifter: lifter.to_string(),
                lift: lift.parse()?,
                attempt: attempt.parse().context("attempt must be a number")?,
                weight: weight.parse().context("weight must be a decimal")?,
            },
            (verb @ ("good" | "nolift" | "pass"), [lifter, lift, attempt]) => Command::Mark {
                lifter: lifter.to_string(),
                lift: lift.parse()?,
                attempt: attempt.parse().context("attempt must be a number")?,
                result: match verb {
                    "good" => AttemptResult::Good,
                    "nolift" => AttemptResult::NoLift,
                    _ => AttemptResult::NoAttempt,
                },
            },
            ("reopen", [lifter, lift, attempt]) => Command::Reopen {
                lifter: lifter.to_string(),
                lift: lift.parse()?,
                attempt: attempt.parse().context("attempt must be a number")?,
            },
            ("clear", [lifter, lift, attempt]) => Command::Clear {
                lifter: lifter.to_string(),
                lift: lift.parse()?,
                attempt: attempt.parse().context("attempt must be a number")?,
            },
            ("order", [lift, attempt]) => Command::Order {
                lift: lift.parse()?,
                attempt: attempt.parse().context("attempt must be a number")?,
            },
            ("status", [lifter]) => Command::Status {
                lifter: lifter.to_string(),
            },
            ("bar", [lift, weight, rest @ ..]) if rest.len() <= 1 => Command::Bar {
                lift: lift.parse()?,
                weight: weight.parse().context("weight must be a decimal")?,
                previous: rest
                    .first()
                    .map(|w| w.parse::<Decimal>())
                    .transpose()
                    .context("previous weight must be a decimal")?,
            },
            ("quit" | "exit", []) => Command::Quit,
            _ => bail!("unknown command: {}", line.trim()),
        };
        Ok(command)
    }
}

pub struct Session<C: Clock> {
    config: MeetConfig,
    key: SessionKey,
    machine: Arc<Mutex<AttemptStateMachine<C>>>,
}

impl<C: Clock + 'static> Session<C> {
    pub fn new(config: MeetConfig, key: SessionKey, machine: AttemptStateMachine<C>) -> Self {
        Self {
            config,
            key,
            machine: Arc::new(Mutex::new(machine)),
        }
    }

    pub async fn entries(&self) -> Vec<Entry> {
        self.machine.lock().await.entries().to_vec()
    }

    /// Run the timer tick every `period` until the returned handle is aborted.
    pub fn spawn_ticker(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let machine = Arc::clone(&self.machine);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let mut machine = machine.lock().await;
                let now = machine.clock().now();
                for key in machine.tick(now) {
                    let name = machine
                        .entry(key.entry_id)
                        .map(|e| e.name.clone())
                        .unwrap_or_default();
                    println!("time: {} {} attempt {} window closed", name, key.lift, key.attempt);
                }
            }
        })
    }

    /// Apply one command. `Ok(None)` means the session should end.
    pub async fn execute(&self, command: Command) -> Result<Option<String>> {
        let mut machine = self.machine.lock().await;

        let output = match command {
            Command::Declare { lifter, lift, attempt, weight } => {
                let id = resolve(machine.entries(), &lifter)?;
                machine
                    .declare_weight(id, lift, attempt, weight)
                    .map_err(describe)?;
                format!("{} {} attempt {}: {}", lifter, lift, attempt, weight)
            }
            Command::Mark { lifter, lift, attempt, result } => {
                let id = resolve(machine.entries(), &lifter)?;
                machine.mark_attempt(id, lift, attempt, result).map_err(describe)?;
                format!("{} {} attempt {}: {:?}", lifter, lift, attempt, result)
            }
            Command::Reopen { lifter, lift, attempt } => {
                let id = resolve(machine.entries(), &lifter)?;
                machine.reopen_attempt(id, lift, attempt).map_err(describe)?;
                format!("{} {} attempt {} reopened", lifter, lift, attempt)
            }
            Command::Clear { lifter, lift, attempt } => {
                let id = resolve(machine.entries(), &lifter)?;
                machine.clear_result(id, lift, attempt).map_err(describe)?;
                format!("{} {} attempt {} cleared", lifter, lift, attempt)
            }
            Command::Order { lift, attempt } => render_order(machine.entries(), &self.key, lift, attempt),
            Command::Status { lifter } => {
                let id = resolve(machine.entries(), &lifter)?;
                let mut lines = Vec::new();
                for lift in Lift::ALL {
                    for attempt in 1..=machine.attempts_per_lift() {
                        let availability = machine.availability(id, lift, attempt)?;
                        let declared = machine
                            .entry(id)
                            .and_then(|e| e.slot(lift, attempt))
                            .and_then(|s| s.declared_weight)
                            .map(|w| w.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        lines.push(format!("{} {}: {} {:?}", lift, attempt, declared, availability));
                    }
                }
                lines.join("\n")
            }
            Command::Bar { lift, weight, previous } => {
                let stack = bar_load(&self.config, lift, weight, previous);
                render_stack(&self.config, weight, &stack)
            }
            Command::Quit => return Ok(None),
        };

        Ok(Some(output))
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        let ticker = self.spawn_ticker(Duration::from_secs(1));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("error: {}", e);
                    continue;
                }
            };
            match self.execute(command).await {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => break,
                Err(e) => println!("{}", e),
            }
        }

        ticker.abort();
        Ok(())
    }
}

/// Find a lifter by id or case-insensitive name.
fn resolve(entries: &[Entry], lifter: &str) -> Result<EntryId> {
    if let Ok(id) = lifter.parse::<EntryId>() {
        return Ok(id);
    }
    entries
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(lifter))
        .map(|e| e.id)
        .ok_or_else(|| anyhow!("no lifter named '{}'", lifter))
}

/// Time-exceeded rejections read differently from weight rejections so the
/// operator can tell them apart.
fn describe(error: EngineError) -> anyhow::Error {
    if error.is_time_exceeded() {
        anyhow!("time exceeded: {}", error)
    } else {
        anyhow!("rejected: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use engine::ManualClock;
    use engine::models::{Equipment, Sex};
    use std::str::FromStr;

    fn kg(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn session() -> (Session<ManualClock>, ManualClock) {
        let key = SessionKey::new(1, 1, "A");
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap());
        let entries = vec![
            Entry::new("Ana", Sex::F, Equipment::Classic, key.clone(), 3),
            Entry::new("Bo", Sex::M, Equipment::Classic, key.clone(), 3),
        ];
        let config = MeetConfig::default();
        let machine = AttemptStateMachine::with_clock(&config, clock.clone()).with_entries(entries);
        (Session::new(config, key, machine), clock)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("declare ana squat 1 102.5").unwrap(),
            Command::Declare {
                lifter: "ana".to_string(),
                lift: Lift::Squat,
                attempt: 1,
                weight: kg("102.5"),
            }
        );
        assert_eq!(
            Command::parse("PASS bo bench 2").unwrap(),
            Command::Mark {
                lifter: "bo".to_string(),
                lift: Lift::Bench,
                attempt: 2,
                result: AttemptResult::NoAttempt,
            }
        );
        assert_eq!(
            Command::parse("bar deadlift 200 190").unwrap(),
            Command::Bar {
                lift: Lift::Deadlift,
                weight: kg("200"),
                previous: Some(kg("190")),
            }
        );
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert!(Command::parse("declare ana squat one 100").is_err());
        assert!(Command::parse("lift ana").is_err());
        assert!(Command::parse("   ").is_err());
    }

    #[tokio::test]
    async fn test_execute_declare_and_order() {
        let (session, _) = session();
        session.execute(Command::parse("declare ana squat 1 120").unwrap()).await.unwrap();
        session.execute(Command::parse("declare bo squat 1 100").unwrap()).await.unwrap();

        let order = session.execute(Command::Order { lift: Lift::Squat, attempt: 1 }).await.unwrap().unwrap();
        let names: Vec<&str> = order.lines().map(|l| l.split_whitespace().nth(1).unwrap()).collect();
        assert_eq!(names, vec!["Bo", "Ana"]);
    }

    #[tokio::test]
    async fn test_rejections_are_labelled() {
        let (session, clock) = session();
        session.execute(Command::parse("declare ana bench 1 60").unwrap()).await.unwrap();
        session.execute(Command::parse("good ana bench 1").unwrap()).await.unwrap();

        let err = session.execute(Command::parse("declare ana bench 2 60").unwrap()).await.unwrap_err();
        assert!(err.to_string().starts_with("rejected:"));

        clock.advance(chrono::TimeDelta::seconds(61));
        session.machine.lock().await.tick(clock.now());

        let err = session.execute(Command::parse("declare ana bench 2 62.5").unwrap()).await.unwrap_err();
        assert!(err.to_string().starts_with("time exceeded:"));
    }

    #[tokio::test]
    async fn test_unknown_lifter_and_quit() {
        let (session, _) = session();
        assert!(session.execute(Command::parse("status zed").unwrap()).await.is_err());
        assert!(session.execute(Command::parse("status ana").unwrap()).await.unwrap().is_some());
        assert!(session.execute(Command::Quit).await.unwrap().is_none());
    }
}
