//! New hire subcommands.

use crate::types::{NewHireId, NewHireInput};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum HireCommand {
    /// Register a new hire
    Add(HireAddArgs),

    /// List new hires
    List {
        #[arg(long)]
        department: Option<String>,
    },

    /// Show a new hire with their onboarding tasks
    Show {
        id: NewHireId,
    },
}

#[derive(Args, Debug)]
pub struct HireAddArgs {
    #[arg(long)]
    pub candidate: i64,

    #[arg(long)]
    pub job: i64,

    #[arg(long)]
    pub company: Option<i64>,

    #[arg(long)]
    pub manager: Option<i64>,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub location: Option<String>,
}

impl From<HireAddArgs> for NewHireInput {
    fn from(args: HireAddArgs) -> Self {
        NewHireInput {
            candidate_id: args.candidate,
            job_id: args.job,
            company_id: args.company,
            manager_id: args.manager,
            start_date: args.start_date,
            department: args.department,
            work_location: args.location,
        }
    }
}
