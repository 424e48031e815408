//! Headless session runner.

use std::io::{self, BufRead, Write};

use farm_core::entity::EntityId;
use farm_core::math::Millis;
use farm_core::simulation::{InteractOutcome, Rejection, Simulation};

use crate::loader::{self, LoadError, World};
use crate::protocol::{Command, EntityRef, Response};
use crate::script::Script;

/// Longest span a single advance may cover: one simulated day.
pub const MAX_ADVANCE_MS: Millis = 86_400_000;

/// Drives one simulation from protocol commands.
#[derive(Debug)]
pub struct HeadlessRunner {
    sim: Simulation,
}

impl HeadlessRunner {
    /// Wrap a built simulation.
    #[must_use]
    pub fn new(sim: Simulation) -> Self {
        Self { sim }
    }

    /// Load world files and build a runner.
    pub fn from_world(world: World) -> Result<Self, LoadError> {
        Ok(Self::new(world.build()?))
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// The greeting sent before the first command.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(self.sim.now(), self.sim.entity_count())
    }

    fn resolve(&self, target: &EntityRef) -> Option<EntityId> {
        match target {
            EntityRef::Id(id) => Some(*id),
            EntityRef::Label(label) => self.sim.find_by_label(label),
        }
    }

    /// Check that moving the clock to `to_ms` is forward and bounded.
    fn check_advance(&self, to_ms: Millis) -> Result<(), String> {
        let now = self.sim.now();
        if to_ms < now {
            return Err(format!("Cannot rewind from {now} to {to_ms}"));
        }
        if to_ms - now > MAX_ADVANCE_MS {
            return Err(format!(
                "Cannot advance {} ms at once (limit {MAX_ADVANCE_MS})",
                to_ms - now
            ));
        }
        Ok(())
    }

    fn advance(&mut self, to_ms: Millis) -> Response {
        let events = self.sim.advance_to(to_ms);
        Response::Events {
            now: self.sim.now(),
            events,
        }
    }

    fn state(&self) -> Response {
        Response::State {
            now: self.sim.now(),
            player: self.sim.player(),
            entities: self.sim.snapshots(),
            hash: self.sim.state_hash(),
        }
    }

    /// Execute one command.
    pub fn execute(&mut self, command: Command) -> Response {
        let name = command.name();
        tracing::debug!(cmd = name, now = self.sim.now(), "Executing command");

        match command {
            Command::Advance { to_ms } => match self.check_advance(to_ms) {
                Ok(()) => self.advance(to_ms),
                Err(message) => Response::error(message, Some(name)),
            },
            Command::Wait { ms } => {
                let target = self
                    .sim
                    .now()
                    .checked_add(ms)
                    .ok_or_else(|| format!("Cannot wait {ms} ms at once (limit {MAX_ADVANCE_MS})"))
                    .and_then(|to_ms| self.check_advance(to_ms).map(|()| to_ms));
                match target {
                    Ok(to_ms) => self.advance(to_ms),
                    Err(message) => Response::error(message, Some(name)),
                }
            }
            Command::Move { direction } => {
                let result = self.sim.move_player(direction);
                Response::PlayerMoved {
                    result,
                    player: self.sim.player(),
                }
            }
            Command::Stop => {
                self.sim.stop_player();
                Response::ack(name)
            }
            Command::Interact { target, action } => {
                let outcome = match self.resolve(&target) {
                    Some(id) => self.sim.attempt_interact(id, action),
                    None => InteractOutcome::Rejected {
                        reason: Rejection::UnknownEntity,
                    },
                };
                Response::Interaction {
                    now: self.sim.now(),
                    outcome,
                }
            }
            Command::Despawn { target } => {
                let Some(id) = self.resolve(&target) else {
                    return Response::error(format!("Unknown entity {target}"), Some(name));
                };
                match self.sim.despawn(id) {
                    Ok(_) => Response::ack(name),
                    Err(e) => Response::error(e.to_string(), Some(name)),
                }
            }
            Command::LoadObstacles { path } => match loader::load_obstacles(&path) {
                Ok(set) => {
                    let active = set.active_count();
                    self.sim.replace_obstacles(set);
                    tracing::info!(path = %path.display(), active, "Obstacles replaced");
                    Response::ack(name)
                }
                Err(e) => Response::error(e.to_string(), Some(name)),
            },
            Command::Query => self.state(),
            Command::Hash => Response::StateHash {
                now: self.sim.now(),
                hash: self.sim.state_hash(),
            },
            Command::Quit => Response::Bye,
        }
    }

    /// Play a script to completion.
    ///
    /// Time advances to each step before it runs; advances that produced
    /// events are included in the output. The last response is always the
    /// state hash at the end of the run.
    pub fn run_script(&mut self, script: &Script) -> Vec<Response> {
        tracing::info!(name = %script.name, steps = script.steps.len(), "Running script");
        let mut responses = Vec::new();

        for step in script.ordered_steps() {
            self.advance_quietly(step.at_ms, &mut responses);
            responses.push(self.execute(step.action.clone().into()));
        }
        if let Some(until) = script.until_ms {
            self.advance_quietly(until, &mut responses);
        }

        responses.push(self.execute(Command::Hash));
        responses
    }

    fn advance_quietly(&mut self, to_ms: Millis, responses: &mut Vec<Response>) {
        if to_ms <= self.sim.now() {
            return;
        }
        if let Err(message) = self.check_advance(to_ms) {
            tracing::warn!(to_ms, "{message}");
            responses.push(Response::error(message, Some("advance")));
            return;
        }
        let events = self.sim.advance_to(to_ms);
        if !events.is_empty() {
            responses.push(Response::Events {
                now: self.sim.now(),
                events,
            });
        }
    }

    /// Serve JSON-line commands until `quit` or end of input.
    pub fn run_io<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        tracing::debug!(
            seed = self.sim.config().seed,
            entities = self.sim.entity_count(),
            "Session started"
        );
        output.write_all(self.ready().to_json_line().as_bytes())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (response, quit) = match Command::from_json(line) {
                Ok(command) => {
                    let quit = command == Command::Quit;
                    (self.execute(command), quit)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected malformed command");
                    (Response::error(format!("Invalid command: {e}"), None), false)
                }
            };

            output.write_all(response.to_json_line().as_bytes())?;
            output.flush()?;
            if quit {
                break;
            }
        }

        tracing::info!(now = self.sim.now(), "Session ended");
        Ok(())
    }
}

/// Result of replaying one world several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismReport {
    /// Final hash of each run.
    pub hashes: Vec<u64>,
    /// Simulation time every run reached.
    pub until_ms: Millis,
}

impl DeterminismReport {
    /// Whether every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Build `world` `runs` times, advance each to `until_ms` in `stride`
/// increments, and compare final hashes.
pub fn verify_world(
    world: &World,
    runs: usize,
    until_ms: Millis,
    stride: Millis,
) -> Result<DeterminismReport, LoadError> {
    let stride = stride.max(1);
    let mut hashes = Vec::with_capacity(runs);

    for run in 0..runs {
        let mut sim = world.clone().build()?;
        let mut t = 0;
        while t < until_ms {
            t = t.saturating_add(stride).min(until_ms);
            sim.advance_to(t);
        }
        let hash = sim.state_hash();
        tracing::debug!(run, hash, "Run finished");
        hashes.push(hash);
    }

    Ok(DeterminismReport { hashes, until_ms })
}
