//! UCI engine subprocess
//!
//! Spawns the engine as a child process and speaks the UCI protocol over
//! its stdin/stdout. Every call blocks until the engine answers, so callers
//! that must stay responsive go through [`super::worker`].

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

use super::analysis::{Evaluation, PositionAnalysis, PvLine};
use super::config::EngineConfig;

/// Error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    #[error("failed to start engine: {0}")]
    Spawn(String),
    /// Failed to communicate with engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Engine returned unexpected response or went away
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Command sent before the UCI handshake completed
    #[error("engine not initialized")]
    NotInitialized,
    /// The engine did not answer within the configured time
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),
    /// The worker owning the engine has stopped
    #[error("engine worker has stopped")]
    WorkerGone,
}

/// Kills the engine process from outside the thread that talks to it.
///
/// A blocked read on the engine's output returns end-of-file once the
/// process is gone.
#[derive(Clone)]
pub struct KillSwitch {
    process: Arc<Mutex<Child>>,
    killed: Arc<AtomicBool>,
}

impl KillSwitch {
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
        let mut child = self.process.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = child.kill() {
            debug!(error = %e, "engine already exited");
        }
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

/// Wrapper around a UCI chess engine
pub struct StockfishEngine {
    /// The child process, shared with any [`KillSwitch`]
    process: Arc<Mutex<Child>>,
    killed: Arc<AtomicBool>,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout reader for receiving responses
    stdout: BufReader<ChildStdout>,
    /// Whether UCI handshake completed
    initialized: bool,
    depth: u8,
}

impl StockfishEngine {
    /// Starts the engine named by `config.path` and performs the UCI
    /// handshake.
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = StockfishEngine::new(&EngineConfig::default())?;
    /// ```
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut engine = Self::spawn(config)?;
        engine.handshake()?;
        Ok(engine)
    }

    /// Starts the engine process without talking to it yet.
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", config.path, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdout".into()))?;

        debug!(path = %config.path, "engine process started");
        Ok(StockfishEngine {
            process: Arc::new(Mutex::new(process)),
            killed: Arc::new(AtomicBool::new(false)),
            stdin,
            stdout: BufReader::new(stdout),
            initialized: false,
            depth: config.depth,
        })
    }

    pub fn kill_switch(&self) -> KillSwitch {
        KillSwitch {
            process: Arc::clone(&self.process),
            killed: Arc::clone(&self.killed),
        }
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    /// Sends a command to the engine
    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        trace!(%cmd, "engine <");
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads a line from the engine
    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Protocol("engine closed its output".into()));
        }
        let line = line.trim().to_string();
        trace!(%line, "engine >");
        Ok(line)
    }

    /// Reads lines until we get the expected response
    fn read_until(&mut self, expected: &str) -> Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// `uci` / `isready` exchange; other commands are refused until it
    /// succeeds.
    pub fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        self.read_until("uciok")?;
        self.sync()?;
        self.initialized = true;
        Ok(())
    }

    /// Round-trips `isready` so earlier commands have taken effect
    fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), EngineError> {
        if self.initialized {
            Ok(())
        } else {
            Err(EngineError::NotInitialized)
        }
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.ensure_initialized()?;
        self.send(&format!("setoption name {} value {}", name, value))
    }

    /// Sets a position from a record string
    ///
    /// # Arguments
    /// * `record` - position record, or None for the starting position
    /// * `moves` - coordinate moves to play from that position
    pub fn set_position(&mut self, record: Option<&str>, moves: &[String]) -> Result<(), EngineError> {
        self.ensure_initialized()?;

        let pos_str = match record {
            Some(r) => format!("position fen {}", r),
            None => "position startpos".to_string(),
        };

        let cmd = if moves.is_empty() {
            pos_str
        } else {
            format!("{} moves {}", pos_str, moves.join(" "))
        };

        self.send(&cmd)
    }

    /// Searches the current position to `depth` plies
    pub fn analyze(&mut self, depth: u8) -> Result<PositionAnalysis, EngineError> {
        self.ensure_initialized()?;
        self.send(&format!("go depth {}", depth))?;

        let lines = self.read_until("bestmove")?;
        let best_move = lines
            .last()
            .and_then(|line| parse_bestmove(line))
            .ok_or_else(|| EngineError::Protocol("engine returned no best move".into()))?;

        let mut analysis = PositionAnalysis {
            best_move,
            evaluation: Evaluation::Centipawns(0),
            depth: 0,
            pv: Vec::new(),
            time_ms: 0,
            nodes: 0,
        };

        for info in lines.iter().filter_map(|line| parse_info_line(line)) {
            if info.multipv.unwrap_or(1) != 1 {
                continue;
            }
            if let Some(depth) = info.depth {
                analysis.depth = depth;
            }
            if let Some(evaluation) = info.evaluation {
                analysis.evaluation = evaluation;
            }
            if !info.pv.is_empty() {
                analysis.pv = info.pv;
            }
            analysis.time_ms = info.time_ms.unwrap_or(analysis.time_ms);
            analysis.nodes = info.nodes.unwrap_or(analysis.nodes);
        }

        Ok(analysis)
    }

    /// Asks for the `count` best moves in `record`, best first.
    ///
    /// The first entry is the engine's own choice; ranking beyond that is
    /// reported as given.
    pub fn best_moves(&mut self, record: &str, count: u8) -> Result<Vec<String>, EngineError> {
        let lines = self.pv_lines(record, count)?;
        Ok(lines
            .iter()
            .filter_map(|line| line.first_move().map(str::to_string))
            .collect())
    }

    /// Runs a MultiPV search on `record` and returns the deepest line of
    /// each rank.
    pub fn pv_lines(&mut self, record: &str, count: u8) -> Result<Vec<PvLine>, EngineError> {
        self.ensure_initialized()?;
        let count = count.max(1);

        self.set_option("MultiPV", &count.to_string())?;
        self.sync()?;
        self.set_position(Some(record), &[])?;
        self.send(&format!("go depth {}", self.depth))?;

        let lines = self.read_until("bestmove")?;
        let mut pv_lines = collect_pv_lines(&lines, count);

        // engines that ignore MultiPV still name a best move
        if pv_lines.is_empty() {
            if let Some(best) = lines.last().and_then(|line| parse_bestmove(line)) {
                pv_lines.push(PvLine {
                    multipv: 1,
                    depth: 0,
                    evaluation: Evaluation::Centipawns(0),
                    pv: vec![best],
                });
            }
        }

        debug!(%record, count, found = pv_lines.len(), "engine search finished");
        Ok(pv_lines)
    }

    /// Quit the engine cleanly
    pub fn quit(&mut self) -> Result<(), EngineError> {
        if !self.is_killed() && self.send("quit").is_ok() {
            // Give it a moment to exit
            std::thread::sleep(Duration::from_millis(100));
        }
        let mut process = self.process.lock().unwrap_or_else(|e| e.into_inner());
        let _ = process.kill(); // Kill if still running
        let _ = process.wait();
        Ok(())
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

/// Fields of one `info` line that matter here
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoLine {
    pub depth: Option<u8>,
    pub multipv: Option<u8>,
    pub evaluation: Option<Evaluation>,
    pub time_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub pv: Vec<String>,
}

/// Parses an `info ...` line; anything else yields `None`.
pub fn parse_info_line(line: &str) -> Option<InfoLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.first() != Some(&"info") {
        return None;
    }

    let mut info = InfoLine::default();
    let mut i = 1;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                info.depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "multipv" => {
                info.multipv = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "score" => {
                let value = parts.get(i + 2).and_then(|s| s.parse::<i32>().ok());
                info.evaluation = match (parts.get(i + 1).copied(), value) {
                    (Some("cp"), Some(cp)) => Some(Evaluation::Centipawns(cp)),
                    (Some("mate"), Some(m)) => Some(Evaluation::Mate(m)),
                    _ => info.evaluation,
                };
                i += 3;
            }
            "time" => {
                info.time_ms = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "nodes" => {
                info.nodes = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "pv" => {
                // Everything after "pv" is the principal variation
                info.pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                break;
            }
            "string" => break,
            _ => {
                i += 1;
            }
        }
    }

    Some(info)
}

/// Move named by a `bestmove e2e4 [ponder e7e5]` line
pub fn parse_bestmove(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    match parts.next() {
        Some("(none)") | None => None,
        Some(mv) => Some(mv.to_string()),
    }
}

/// Keeps the deepest line for each MultiPV rank up to `count`, in rank
/// order.
pub fn collect_pv_lines(lines: &[String], count: u8) -> Vec<PvLine> {
    let mut by_rank: BTreeMap<u8, PvLine> = BTreeMap::new();

    for info in lines.iter().filter_map(|line| parse_info_line(line)) {
        let rank = info.multipv.unwrap_or(1);
        if rank == 0 || rank > count || info.pv.is_empty() {
            continue;
        }
        let depth = info.depth.unwrap_or(0);
        let deeper = by_rank.get(&rank).map_or(true, |seen| depth >= seen.depth);
        if deeper {
            by_rank.insert(
                rank,
                PvLine {
                    multipv: rank,
                    depth,
                    evaluation: info.evaluation.unwrap_or(Evaluation::Centipawns(0)),
                    pv: info.pv,
                },
            );
        }
    }

    by_rank.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_info_line() {
        let info = parse_info_line(
            "info depth 18 seldepth 24 multipv 2 score cp -35 nodes 123456 nps 999 time 812 pv d7d5 c2c4 e7e6",
        )
        .unwrap();
        assert_eq!(info.depth, Some(18));
        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.evaluation, Some(Evaluation::Centipawns(-35)));
        assert_eq!(info.nodes, Some(123456));
        assert_eq!(info.time_ms, Some(812));
        assert_eq!(info.pv, ["d7d5", "c2c4", "e7e6"]);
    }

    #[test]
    fn test_parse_mate_score_and_non_info() {
        let info = parse_info_line("info depth 5 score mate -2 pv h4e1").unwrap();
        assert_eq!(info.evaluation, Some(Evaluation::Mate(-2)));
        assert!(parse_info_line("bestmove e2e4").is_none());
        assert!(parse_info_line("info string NNUE enabled").unwrap().pv.is_empty());
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5").as_deref(), Some("e2e4"));
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("info depth 1"), None);
    }

    #[test]
    fn test_collect_pv_lines_keeps_deepest_per_rank() {
        let output = lines(&[
            "info depth 1 multipv 1 score cp 10 pv d2d4",
            "info depth 1 multipv 2 score cp 5 pv e2e4",
            "info depth 2 multipv 2 score cp 30 pv g1f3",
            "info depth 2 multipv 1 score cp 40 pv e2e4 e7e5",
            "info depth 2 multipv 3 score cp 1 pv c2c4",
            "bestmove e2e4 ponder e7e5",
        ]);

        let pv = collect_pv_lines(&output, 2);
        assert_eq!(pv.len(), 2);
        assert_eq!(pv[0].first_move(), Some("e2e4"));
        assert_eq!(pv[0].evaluation, Evaluation::Centipawns(40));
        assert_eq!(pv[1].first_move(), Some("g1f3"));
        assert_eq!(pv[1].depth, 2);
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let config = EngineConfig {
            path: "/nonexistent/engine-binary".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(StockfishEngine::new(&config), Err(EngineError::Spawn(_))));
    }

    #[cfg(unix)]
    fn scripted(script: &str) -> EngineConfig {
        EngineConfig {
            path: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            depth: 1,
            ..EngineConfig::default()
        }
    }

    #[cfg(unix)]
    const SILENT_SEARCH: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "bestmove (none)" ;;
    quit) exit 0 ;;
  esac
done
"#;

    #[cfg(unix)]
    #[test]
    fn test_commands_wait_for_handshake() {
        let mut engine = StockfishEngine::spawn(&scripted(SILENT_SEARCH)).unwrap();
        assert!(matches!(
            engine.set_position(None, &[]),
            Err(EngineError::NotInitialized)
        ));

        engine.handshake().unwrap();
        assert!(engine.set_position(None, &[]).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_best_move_is_a_protocol_error() {
        let mut engine = StockfishEngine::new(&scripted(SILENT_SEARCH)).unwrap();
        engine
            .set_position(Some("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"), &[])
            .unwrap();
        assert!(matches!(engine.analyze(1), Err(EngineError::Protocol(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_kill_switch_unblocks_a_hung_search() {
        let script = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
  esac
done
"#;
        let mut engine = StockfishEngine::new(&scripted(script)).unwrap();
        let switch = engine.kill_switch();
        let killer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            switch.kill();
        });

        engine.set_position(None, &[]).unwrap();
        assert!(matches!(
            engine.analyze(1),
            Err(EngineError::Protocol(_)) | Err(EngineError::Io(_))
        ));
        assert!(engine.is_killed());
        killer.join().unwrap();
    }

    #[test]
    #[ignore] // requires stockfish installed
    fn test_stockfish_best_moves() {
        let config = EngineConfig {
            depth: 10,
            ..EngineConfig::default()
        };
        let mut engine = StockfishEngine::new(&config).unwrap();
        let moves = engine
            .best_moves("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 3)
            .unwrap();
        assert_eq!(moves.len(), 3);
    }

    #[test]
    #[ignore]
    fn test_analyze_starting_position() {
        let mut engine = StockfishEngine::new(&EngineConfig::default()).unwrap();
        engine.set_position(None, &[]).unwrap();
        let analysis = engine.analyze(10).unwrap();

        assert!(!analysis.best_move.is_empty());
        println!("{}", analysis.summary());
    }
}
