//! `trackforge stats`.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use trackforge::stats::{WEEKDAYS, weekly_rhythm};

use super::super::Cli;

pub async fn cmd_stats(cli: &Cli, project_dir: &Path) -> Result<()> {
    let ws = super::open_workspace(cli, project_dir).await?;
    let dashboard = ws.dashboard(Utc::now());

    println!();
    println!("{}", console::style("Dashboard").bold().cyan());
    println!("  Active Tasks          {}", dashboard.active_tasks);
    println!("  Completed This Week   {}", dashboard.completed_this_week);
    println!("  Productivity          {}%", dashboard.productivity);

    if let Some(business) = &dashboard.business {
        println!();
        println!("{}", console::style("Business").bold().cyan());
        println!("  Total Clients         {}", business.total_clients);
        println!("  Active Projects       {}", business.active_projects);
        println!("  Revenue Potential     ${:.0}", business.revenue_potential);
    }

    let rhythm = weekly_rhythm(ws.tasks().tasks());
    let peak = rhythm.iter().copied().max().unwrap_or(0).max(1);
    println!();
    println!("{}", console::style("Weekly Rhythm").bold().cyan());
    for (day, count) in WEEKDAYS.iter().zip(rhythm) {
        let bar = "#".repeat(count * 20 / peak);
        println!("  {}  {:<20} {}", day, bar, count);
    }
    println!();
    Ok(())
}
