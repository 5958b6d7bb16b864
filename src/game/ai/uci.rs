//! UCI client over an async byte stream
//!
//! # Session
//!
//! ```text
//! > uci                       < id name ... / uciok
//! > setoption name Threads value N
//! > isready                   < readyok
//! > ucinewgame
//! > isready                   < readyok
//! ... per move:
//! > position fen <fen>
//! > go depth <d>              < info ... / bestmove <m> [ponder <m>]
//! ... at the end:
//! > quit
//! ```

use super::search::{parse_bestmove, parse_info, BestMoveLine, SearchResult};
use super::{Oracle, OracleError, OracleResult};
use crate::core::settings::EngineSettings;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

/// A UCI engine connection
pub struct UciEngine<R, W> {
    reader: BufReader<R>,
    writer: W,
    child: Option<Child>,
    name: Option<String>,
}

impl UciEngine<ChildStdout, ChildStdin> {
    /// Start the engine process and run the session handshake
    pub async fn spawn(settings: &EngineSettings) -> OracleResult<Self> {
        let mut child = Command::new(&settings.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OracleError::Spawn {
                path: settings.path.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(OracleError::ConnectionLost)?;
        let stdout = child.stdout.take().ok_or(OracleError::ConnectionLost)?;

        let mut engine = Self::from_io(stdout, stdin);
        engine.child = Some(child);
        engine.handshake(settings.threads, &settings.options).await?;
        Ok(engine)
    }
}

impl<R, W> UciEngine<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap an already-connected stream pair; no commands are sent
    pub fn from_io(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            child: None,
            name: None,
        }
    }

    /// Engine name from `id name`, once [`UciEngine::init`] has run
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Initialize, configure threads and extra options, and reset for a game
    pub async fn handshake(
        &mut self,
        threads: usize,
        options: &BTreeMap<String, String>,
    ) -> OracleResult<()> {
        self.init().await?;
        self.set_option("Threads", &threads.to_string()).await?;
        for (name, value) in options {
            self.set_option(name, value).await?;
        }
        self.is_ready().await?;
        self.new_game().await?;
        info!(
            "[ORACLE] {} ready ({} threads)",
            self.name().unwrap_or("engine"),
            threads
        );
        Ok(())
    }

    /// `uci` until `uciok`
    pub async fn init(&mut self) -> OracleResult<()> {
        self.send("uci").await?;
        loop {
            let line = self.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = Some(name.trim().to_string());
            } else if line == "uciok" {
                return Ok(());
            }
        }
    }

    pub async fn set_option(&mut self, name: &str, value: &str) -> OracleResult<()> {
        self.send(&format!("setoption name {name} value {value}")).await
    }

    /// `isready` until `readyok`
    pub async fn is_ready(&mut self) -> OracleResult<()> {
        self.send("isready").await?;
        while self.read_line().await? != "readyok" {}
        Ok(())
    }

    pub async fn new_game(&mut self) -> OracleResult<()> {
        self.send("ucinewgame").await?;
        self.is_ready().await
    }

    pub async fn set_position(&mut self, fen: &str) -> OracleResult<()> {
        self.send(&format!("position fen {fen}")).await
    }

    /// `go depth` and read until `bestmove`
    pub async fn go_depth(&mut self, depth: u32) -> OracleResult<SearchResult> {
        self.send(&format!("go depth {depth}")).await?;

        let mut last_depth = None;
        let mut last_score = None;
        loop {
            let line = self.read_line().await?;
            if let Some(info) = parse_info(&line) {
                last_depth = info.depth.or(last_depth);
                last_score = info.score.or(last_score);
                continue;
            }
            if !line.starts_with("bestmove") {
                continue;
            }

            return match parse_bestmove(&line) {
                Some(BestMoveLine::Move { best, ponder }) => Ok(SearchResult {
                    best_move: best,
                    ponder,
                    score: last_score,
                    depth: last_depth,
                }),
                Some(BestMoveLine::NoMove) => Err(OracleError::NoMove),
                None => Err(OracleError::MalformedResponse { line }),
            };
        }
    }

    /// Send `quit` and reap the process if this connection owns one
    pub async fn quit(mut self) -> OracleResult<()> {
        self.send("quit").await?;
        if let Some(mut child) = self.child.take() {
            let status = child.wait().await?;
            debug!("[ORACLE] Engine exited with {}", status);
        }
        Ok(())
    }

    async fn send(&mut self, command: &str) -> OracleResult<()> {
        debug!("[ORACLE] > {}", command);
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> OracleResult<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(OracleError::ConnectionLost);
        }
        let line = line.trim().to_string();
        debug!("[ORACLE] < {}", line);
        Ok(line)
    }
}

#[async_trait]
impl<R, W> Oracle for UciEngine<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn best_move(&mut self, position: &str, depth: u32) -> OracleResult<SearchResult> {
        self.set_position(position).await?;
        self.go_depth(depth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ai::Score;
    use tokio::io::{duplex, split, DuplexStream, ReadHalf, WriteHalf};
    use tokio::task::JoinHandle;

    type TestEngine = UciEngine<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

    /// Scripted engine: answers each received command via `reply` and returns
    /// every command it saw once the client hangs up or `reply` says stop
    fn scripted_engine<F>(mut reply: F) -> (TestEngine, JoinHandle<Vec<String>>)
    where
        F: FnMut(&str) -> Option<Vec<&'static str>> + Send + 'static,
    {
        let (client, server) = duplex(8192);
        let (client_read, client_write) = split(client);
        let (server_read, mut server_write) = split(server);

        let task = tokio::spawn(async move {
            let mut received = Vec::new();
            let mut lines = BufReader::new(server_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                received.push(line.clone());
                let Some(responses) = reply(&line) else {
                    break;
                };
                for response in responses {
                    let out = format!("{response}\n");
                    if server_write.write_all(out.as_bytes()).await.is_err() {
                        return received;
                    }
                }
            }
            received
        });

        (UciEngine::from_io(client_read, client_write), task)
    }

    fn stockfish_like(command: &str) -> Option<Vec<&'static str>> {
        Some(match command {
            "uci" => vec!["id name Fishy 1.0", "id author test", "option name Threads type spin", "uciok"],
            "isready" => vec!["readyok"],
            c if c.starts_with("go depth") => vec![
                "info string NNUE enabled",
                "info depth 1 seldepth 1 score cp 20 pv e2e4",
                "info depth 7 seldepth 9 score cp 31 nodes 4000 pv e2e4 e7e5",
                "bestmove e2e4 ponder e7e5",
            ],
            "quit" => return None,
            _ => vec![],
        })
    }

    #[tokio::test]
    async fn test_handshake_and_search() {
        let (mut engine, task) = scripted_engine(stockfish_like);

        let mut options = BTreeMap::new();
        options.insert("Hash".to_string(), "64".to_string());
        engine.handshake(12, &options).await.unwrap();
        assert_eq!(engine.name(), Some("Fishy 1.0"));

        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let result = engine.best_move(fen, 7).await.unwrap();
        assert_eq!(result.best_move.to_string(), "e2e4");
        assert_eq!(result.ponder.map(|m| m.to_string()), Some("e7e5".to_string()));
        assert_eq!(result.depth, Some(7));
        assert_eq!(result.score, Some(Score::Cp(31)));

        engine.quit().await.unwrap();
        let received = task.await.unwrap();
        assert_eq!(
            received,
            vec![
                "uci".to_string(),
                "setoption name Threads value 12".to_string(),
                "setoption name Hash value 64".to_string(),
                "isready".to_string(),
                "ucinewgame".to_string(),
                "isready".to_string(),
                format!("position fen {fen}"),
                "go depth 7".to_string(),
                "quit".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_promotion_best_move() {
        let (mut engine, _task) = scripted_engine(|command| {
            Some(if command.starts_with("go") {
                vec!["bestmove e7e8q"]
            } else {
                vec![]
            })
        });

        let result = engine.best_move("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1", 3).await.unwrap();
        assert_eq!(result.best_move.to_string(), "e7e8q");
        assert_eq!(result.ponder, None);
        assert_eq!(result.score, None);
    }

    #[tokio::test]
    async fn test_engine_exit_is_connection_lost() {
        let (mut engine, _task) = scripted_engine(|_| None);
        let err = engine.init().await.unwrap_err();
        assert!(matches!(err, OracleError::ConnectionLost));
    }

    #[tokio::test]
    async fn test_malformed_bestmove() {
        let (mut engine, _task) = scripted_engine(|command| {
            Some(if command.starts_with("go") {
                vec!["bestmove zz99"]
            } else {
                vec![]
            })
        });

        let err = engine.go_depth(5).await.unwrap_err();
        match err {
            OracleError::MalformedResponse { line } => assert_eq!(line, "bestmove zz99"),
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_legal_move() {
        let (mut engine, _task) = scripted_engine(|command| {
            Some(if command.starts_with("go") {
                vec!["info depth 0 score mate 0", "bestmove (none)"]
            } else {
                vec![]
            })
        });

        let err = engine.go_depth(5).await.unwrap_err();
        assert!(matches!(err, OracleError::NoMove));
    }

    #[tokio::test]
    async fn test_spawn_missing_binary() {
        let settings = EngineSettings {
            path: "/nonexistent/engine-binary".into(),
            ..EngineSettings::default()
        };
        let err = UciEngine::spawn(&settings).await.err().unwrap();
        assert!(matches!(err, OracleError::Spawn { .. }));
    }
}
