//! Types for representing engine output

use std::fmt;

/// Represents a position evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn score from the side to move's point of view
    Centipawns(i32),
    /// Forced mate in N (negative = the side to move gets mated)
    Mate(i32),
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// One MultiPV line of an `info` report
#[derive(Debug, Clone, PartialEq)]
pub struct PvLine {
    /// 1-based MultiPV rank
    pub multipv: u8,
    pub depth: u8,
    pub evaluation: Evaluation,
    /// Principal variation in coordinate notation
    pub pv: Vec<String>,
}

impl PvLine {
    pub fn first_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

/// Complete analysis of a position
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    /// Best move found
    pub best_move: String,
    /// Evaluation of the position
    pub evaluation: Evaluation,
    /// Analysis depth reached
    pub depth: u8,
    /// Principal variation (best line of play)
    pub pv: Vec<String>,
    /// Time spent analyzing (milliseconds)
    pub time_ms: u64,
    /// Nodes searched
    pub nodes: u64,
}

impl PositionAnalysis {
    /// Returns a brief summary of the analysis
    pub fn summary(&self) -> String {
        format!(
            "Eval: {} | Best: {} | Depth: {} | PV: {}",
            self.evaluation,
            self.best_move,
            self.depth,
            self.pv.iter().take(5).cloned().collect::<Vec<_>>().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_display() {
        assert_eq!(Evaluation::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Evaluation::Mate(3).to_string(), "M3");
        assert_eq!(Evaluation::Mate(-2).to_string(), "M-2");
    }

    #[test]
    fn test_summary() {
        let analysis = PositionAnalysis {
            best_move: "e2e4".to_string(),
            evaluation: Evaluation::Centipawns(20),
            depth: 12,
            pv: vec!["e2e4".to_string(), "e7e5".to_string()],
            time_ms: 50,
            nodes: 1000,
        };
        assert_eq!(analysis.summary(), "Eval: +0.20 | Best: e2e4 | Depth: 12 | PV: e2e4 e7e5");
    }
}
