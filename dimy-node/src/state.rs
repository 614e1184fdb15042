//! Ties the node's modules into the cooperative scheduler loop described by
//! spec.md §5, grounded on `examples/original_source/client.py`'s `Client`
//! (the single object owning every piece of shared state the scheduler's
//! tasks touch without locks).

use std::collections::{HashSet, VecDeque};

use dimy_core::shamir;
use dimy_types::constants::{DBF_TIME, EPHID_TIME, QBF_TIME, SHARE_CLEAN_TIME, SHARE_TIME};
use dimy_types::{BroadcastPacket, EphIdHash, UploadKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument, warn};

use crate::backend_client;
use crate::clock::ScaledClock;
use crate::commands::{Command, CommandScript};
use crate::config::NodeConfig;
use crate::dbf_pipeline::DbfPipeline;
use crate::ephid_gen::{self, QueuedShare};
use crate::error::NodeError;
use crate::scheduler::Scheduler;
use crate::share_io::{RecvSocket, SendSocket};
use crate::share_table::ShareTable;

/// The kind of work a scheduled event performs; each variant corresponds to
/// one of spec.md §4.4–§4.9's periodic ticks or the command interpreter.
#[derive(Debug, Clone, Copy)]
enum Task {
    EphidGen,
    ShareBroadcast,
    ShareClean,
    Listen,
    QbfCreate,
    DbfCycle,
    Command,
    PositiveUndo,
}

/// Scheduling priority: lower runs first among events due at the same
/// instant. QBF construction must win over DBF cycling (spec.md §4.7).
const PRIO_DEFAULT: u8 = 1;
const PRIO_DBF_CYCLE: u8 = 2;

/// All per-node state the scheduler's tasks share (spec.md §3, §5): no
/// locks, because the single-threaded cooperative loop guarantees only one
/// task body runs at a time.
pub struct NodeState {
    server_addr: (String, u16),
    clock: ScaledClock,
    share_drop: f64,
    scheduler: Scheduler<Task>,
    command_script: CommandScript,
    send_socket: SendSocket,
    recv_socket: Option<RecvSocket>,
    location: u16,
    wait_time: f64,
    own_shares: HashSet<EphIdHash>,
    share_table: ShareTable,
    eph_queue: VecDeque<QueuedShare>,
    last_secret: Option<dimy_core::Scalar>,
    dbf: DbfPipeline,
    rng: StdRng,
}

impl NodeState {
    /// Builds a node from its CLI configuration; does not yet bind a
    /// socket or touch the filesystem beyond loading the command script.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let command_script = CommandScript::load(&config.command_file_path)?;
        let send_socket = SendSocket::bind()?;
        Ok(Self {
            server_addr: (config.server_ip, config.server_port),
            clock: ScaledClock::new(config.time_scale),
            share_drop: config.share_drop,
            scheduler: Scheduler::new(),
            command_script,
            send_socket,
            recv_socket: None,
            location: 0,
            wait_time: 0.0,
            own_shares: HashSet::new(),
            share_table: ShareTable::new(),
            eph_queue: VecDeque::new(),
            last_secret: None,
            dbf: DbfPipeline::new(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Runs the node until `STOP` or a fatal error (spec.md §7's
    /// `ProgramStop`/`BindFailure`).
    pub async fn run(&mut self) -> Result<(), NodeError> {
        self.scheduler.schedule(0.0, PRIO_DEFAULT, Task::Command);
        self.scheduler
            .schedule(self.clock.now(), PRIO_DEFAULT, Task::EphidGen);
        self.schedule_periodic(Task::ShareBroadcast, SHARE_TIME.as_secs_f64(), PRIO_DEFAULT);
        self.schedule_periodic(Task::ShareClean, EPHID_TIME.as_secs_f64(), PRIO_DEFAULT);
        self.scheduler
            .schedule(self.clock.now() + 0.1, PRIO_DEFAULT, Task::Listen);
        self.schedule_periodic(Task::QbfCreate, QBF_TIME.as_secs_f64(), PRIO_DEFAULT);
        self.schedule_periodic(Task::DbfCycle, DBF_TIME.as_secs_f64(), PRIO_DBF_CYCLE);

        loop {
            let Some((time, task)) = self.scheduler.pop() else {
                return Ok(());
            };
            let delay = time - self.clock.now();
            if delay > 0.0 {
                self.clock.sleep(delay).await;
            }
            match self.dispatch(task).await {
                Ok(()) => {}
                Err(NodeError::ProgramStop) => {
                    info!("stopping");
                    return Ok(());
                }
                Err(err @ NodeError::BindFailure { .. }) => return Err(err),
                Err(err) => warn!(%err, "non-fatal error, continuing"),
            }
        }
    }

    fn schedule_periodic(&mut self, task: Task, interval: f64, priority: u8) {
        let delay = self.clock.time_until_next_multiple(interval);
        self.scheduler
            .schedule(self.clock.now() + delay, priority, task);
    }

    async fn dispatch(&mut self, task: Task) -> Result<(), NodeError> {
        match task {
            Task::EphidGen => self.on_ephid_gen(),
            Task::ShareBroadcast => self.on_share_broadcast().await,
            Task::ShareClean => self.on_share_clean(),
            Task::Listen => self.on_listen(),
            Task::QbfCreate => self.on_qbf_create().await,
            Task::DbfCycle => self.on_dbf_cycle(),
            Task::Command => self.on_command().await,
            Task::PositiveUndo => self.on_positive_undo(),
        }
    }

    /// spec.md §4.4.
    fn on_ephid_gen(&mut self) -> Result<(), NodeError> {
        self.schedule_periodic(Task::EphidGen, EPHID_TIME.as_secs_f64(), PRIO_DEFAULT);
        let (packets, hash) = ephid_gen::generate(&mut self.rng);
        debug!(hash = ?hash, count = packets.len(), "generated ephid");
        self.own_shares.insert(hash);
        self.eph_queue.extend(packets);
        Ok(())
    }

    /// spec.md §4.5.
    async fn on_share_broadcast(&mut self) -> Result<(), NodeError> {
        self.schedule_periodic(Task::ShareBroadcast, SHARE_TIME.as_secs_f64(), PRIO_DEFAULT);
        let Some(packet) = self.eph_queue.pop_front() else {
            return Ok(());
        };
        if self.rng.gen_bool(self.share_drop.clamp(0.0, 1.0)) {
            debug!(idx = packet.share.index, "dropped share");
            return Ok(());
        }
        self.last_secret = Some(dimy_core::Scalar::from_bytes(&packet.secret));
        let mut share_bytes = [0u8; 32];
        share_bytes.copy_from_slice(&packet.share.payload);
        let wire = BroadcastPacket {
            idx: packet.share.index,
            share: share_bytes,
            hash: packet.hash.0,
        };
        if let Err(err) = self.send_socket.broadcast(self.location, &wire).await {
            warn!(%err, "broadcast send failed");
        } else {
            debug!(idx = wire.idx, "broadcast share");
        }
        Ok(())
    }

    /// spec.md §3 `SHARE_CLEAN_TIME`.
    fn on_share_clean(&mut self) -> Result<(), NodeError> {
        self.schedule_periodic(Task::ShareClean, EPHID_TIME.as_secs_f64(), PRIO_DEFAULT);
        self.share_table
            .clean(self.clock.now(), SHARE_CLEAN_TIME.as_secs_f64());
        Ok(())
    }

    /// spec.md §4.6.
    #[instrument(skip(self))]
    fn on_listen(&mut self) -> Result<(), NodeError> {
        self.scheduler
            .schedule(self.clock.now() + 0.1, PRIO_DEFAULT, Task::Listen);
        let Some(io) = &self.recv_socket else {
            return Ok(());
        };
        let Some(packet) = io.try_recv() else {
            return Ok(());
        };
        let hash = EphIdHash::from_bytes(packet.hash);
        if self.own_shares.contains(&hash) {
            return Ok(());
        }
        let count = self
            .share_table
            .insert(hash, packet.idx, packet.share.to_vec(), self.clock.now());
        if count < dimy_types::constants::K as usize {
            return Ok(());
        }
        self.attempt_reconstruction(hash);
        Ok(())
    }

    fn attempt_reconstruction(&mut self, hash: EphIdHash) {
        let Some(shares) = self.share_table.shares(&hash) else {
            return;
        };
        let subset: Vec<(u8, &[u8])> = shares
            .iter()
            .take(dimy_types::constants::K as usize)
            .map(|(idx, payload)| (*idx, payload.as_slice()))
            .collect();
        let Ok(public) = shamir::combine(&subset) else {
            return;
        };
        let Ok(public): Result<[u8; 32], _> = public.try_into() else {
            return;
        };
        let recomputed = dimy_core::blake2b_32(&public);
        if recomputed.ct_eq(&hash.0).unwrap_u8() != 1 {
            // Hash mismatch: discard the attempt, keep the shares for more
            // arrivals (spec.md §4.6, §7).
            return;
        }
        debug!(hash = ?hash, "reconstructed peer ephid");
        let Some(secret) = self.last_secret.as_ref() else {
            return;
        };
        match dimy_core::shared_enc_id(&public, secret) {
            Ok(enc_id) => {
                self.dbf.add_enc_id(&enc_id);
                self.share_table.clear_shares(&hash);
            }
            Err(err) => {
                warn!(%err, "invalid point during dh derivation");
            }
        }
    }

    /// spec.md §4.7.
    async fn on_qbf_create(&mut self) -> Result<(), NodeError> {
        self.schedule_periodic(Task::QbfCreate, QBF_TIME.as_secs_f64(), PRIO_DEFAULT);
        let combined = self.dbf.combine();
        let kind = if self.dbf.is_cbf {
            UploadKind::Cbf
        } else {
            UploadKind::Qbf
        };
        self.upload(kind, &combined).await;
        Ok(())
    }

    /// spec.md §4.7.
    fn on_dbf_cycle(&mut self) -> Result<(), NodeError> {
        self.schedule_periodic(Task::DbfCycle, DBF_TIME.as_secs_f64(), PRIO_DBF_CYCLE);
        self.dbf.cycle();
        debug!(len = self.dbf.len(), "cycled dbf ring");
        Ok(())
    }

    /// spec.md §4.9.
    async fn on_command(&mut self) -> Result<(), NodeError> {
        match self.command_script.next() {
            Command::Move(port) => {
                self.recv_socket = Some(RecvSocket::bind(port)?);
                self.location = port;
                self.scheduler.schedule(self.clock.now(), PRIO_DEFAULT, Task::Command);
                info!(port, "moved");
            }
            Command::Wait(seconds) => {
                self.wait_time += seconds;
                self.scheduler
                    .schedule(self.wait_time, PRIO_DEFAULT, Task::Command);
                debug!(seconds, "waiting");
            }
            Command::Positive(period) => {
                self.scheduler.schedule(self.clock.now(), PRIO_DEFAULT, Task::Command);
                self.dbf.is_cbf = true;
                let combined = self.dbf.combine();
                self.upload(UploadKind::Cbf, &combined).await;
                self.scheduler.schedule(
                    self.wait_time + period as f64,
                    PRIO_DEFAULT,
                    Task::PositiveUndo,
                );
                info!(period, "diagnosed positive");
            }
            Command::Stop => return Err(NodeError::ProgramStop),
        }
        Ok(())
    }

    fn on_positive_undo(&mut self) -> Result<(), NodeError> {
        self.dbf.is_cbf = false;
        info!("no longer considered positive");
        Ok(())
    }

    /// Snapshot of the filter this node would upload on its next QBF/CBF
    /// tick. Exposed for integration tests that need to inspect a node's
    /// accumulated contacts without waiting for the next periodic upload.
    pub fn combined_filter(&self) -> dimy_core::BloomFilter {
        self.dbf.combine()
    }

    async fn upload(&self, kind: UploadKind, filter: &dimy_core::BloomFilter) {
        let addr = (self.server_addr.0.as_str(), self.server_addr.1);
        match backend_client::upload(addr, kind, filter).await {
            Ok(response) => info!(%response, "backend responded"),
            Err(err) => warn!(%err, "upload failed, will retry next cycle"),
        }
    }
}
