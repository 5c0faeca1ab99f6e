use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use reachme_core::card::ContactChannel;

#[derive(Parser)]
#[command(name = "reachme")]
#[command(about = "Vehicle owner contact card with PIN-gated detail sharing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local storage file (device key, offline preferences)
    #[arg(long, global = true, value_name = "PATH")]
    pub storage: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the contact card
    Show {
        /// Contact card JSON file
        #[arg(long, value_name = "PATH")]
        card: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show whether contact details are currently shared
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn sharing of contact details on or off (requires the owner PIN)
    Toggle {
        /// Target visibility
        #[arg(value_enum)]
        visibility: Visibility,
        /// Owner PIN (prompted when omitted)
        #[arg(long, value_name = "PIN")]
        pin: Option<String>,
        /// Exit right away instead of waiting for auto-logout
        #[arg(long)]
        no_wait: bool,
    },
    /// Get a call or WhatsApp link for one of the owner's numbers
    Contact {
        /// Contact number position on the card, starting at 1
        index: usize,
        /// How to reach the owner
        #[arg(long, value_enum, default_value_t = Channel::Call)]
        via: Channel,
        /// Contact card JSON file
        #[arg(long, value_name = "PATH")]
        card: Option<PathBuf>,
        /// Skip the misuse warning confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List emergency numbers
    Emergency,
    /// Print this device's key
    DeviceKey {
        /// Forget the stored key and generate a new one
        #[arg(long)]
        reset: bool,
    },
    /// Configure the preference store and default card
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Visibility {
    On,
    Off,
}

impl Visibility {
    pub const fn show_details(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Channel {
    Call,
    #[value(name = "whatsapp")]
    WhatsApp,
}

impl From<Channel> for ContactChannel {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Call => Self::Call,
            Channel::WhatsApp => Self::WhatsApp,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update the CLI config
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Default contact card JSON file
        #[arg(long, value_name = "PATH")]
        card: Option<PathBuf>,
    },
    /// Print the current CLI config
    Show,
}
