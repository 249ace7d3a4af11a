//! Sector performance (static example figures, percent).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub sector: &'static str,
    pub change_pct: f64,
}

impl SectorPerformance {
    pub fn is_gain(&self) -> bool {
        self.change_pct > 0.0
    }
}

const SECTORS: [SectorPerformance; 6] = [
    SectorPerformance { sector: "Technology", change_pct: 2.5 },
    SectorPerformance { sector: "Healthcare", change_pct: -1.2 },
    SectorPerformance { sector: "Financials", change_pct: 1.8 },
    SectorPerformance { sector: "Energy", change_pct: -0.5 },
    SectorPerformance { sector: "Utilities", change_pct: 0.7 },
    SectorPerformance { sector: "Consumer Discretionary", change_pct: 3.0 },
];

pub fn sector_performance() -> &'static [SectorPerformance] {
    &SECTORS
}
