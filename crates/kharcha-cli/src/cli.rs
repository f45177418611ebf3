use clap::{Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum Period {
    #[default]
    Today,
    Week,
    Month,
    All,
}

impl Period {
    pub fn to_summary_period(self) -> kharcha_core::conversation::SummaryPeriod {
        use kharcha_core::conversation::SummaryPeriod;
        match self {
            Period::Today => SummaryPeriod::Today,
            Period::Week => SummaryPeriod::Week,
            Period::Month => SummaryPeriod::Month,
            Period::All => SummaryPeriod::AllTime,
        }
    }
}

#[derive(Parser)]
#[command(name = "kharcha")]
#[command(version, about = "Kharcha - chat-style personal expense tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to ~/.kharcha/kharcha.db)
    #[arg(long, global = true, env = "KHARCHA_DB_PATH")]
    pub db_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the intake flow from the terminal
    Chat {
        /// User id the conversation is attributed to
        #[arg(long, default_value = "local")]
        user: String,
    },

    /// List recorded expenses
    Expenses {
        /// User id to list expenses for
        #[arg(long, default_value = "local")]
        user: String,

        /// Maximum number of rows
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show an expense summary for a period
    Summary {
        /// User id to summarize
        #[arg(long, default_value = "local")]
        user: String,

        #[arg(value_enum, default_value_t = Period::Today)]
        period: Period,
    },

    /// Purge expired pending sessions now
    Cleanup,
}
