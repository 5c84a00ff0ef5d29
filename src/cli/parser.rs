use clap::{Parser, Subcommand};

/// Command-line interface definition for listinha
/// CLI application for a shared shopping list backed by SQLite
#[derive(Parser)]
#[command(
    name = "listinha",
    version = env!("CARGO_PKG_VERSION"),
    about = "A shared shopping list in your terminal: categories, spend totals and list chat",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (the config file is never written)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Sign in with e-mail and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Sign out and clear the local session
    Logout,

    /// Request a password recovery token for an e-mail address
    ResetPassword {
        /// Account e-mail
        email: String,
    },

    /// Redeem a recovery token and sign in to choose a new password
    Recover {
        #[arg(long)]
        token: String,

        /// New password (at least 6 characters)
        #[arg(long = "new-password")]
        new_password: Option<String>,
    },

    /// Show the signed-in account, or change its password
    Account {
        #[arg(long = "new-password", help = "Set a new password (at least 6 characters)")]
        new_password: Option<String>,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Add an item to the active list
    Add {
        /// Item name
        name: String,

        /// Price, Brazilian format accepted ("1.200,50", "10,50", "7.99")
        price: String,

        /// Category the item belongs to (name or id)
        #[arg(long)]
        category: String,

        /// Product link
        #[arg(long)]
        link: Option<String>,

        /// Free-form note
        #[arg(long = "obs")]
        observation: Option<String>,
    },

    /// Edit an item
    Edit {
        /// Item to edit (name or id)
        item: String,

        #[arg(long)]
        name: Option<String>,

        /// New price, Brazilian format accepted
        #[arg(long)]
        price: Option<String>,

        /// Move to another category (name or id)
        #[arg(long)]
        category: Option<String>,

        /// New link; pass an empty string to clear it
        #[arg(long)]
        link: Option<String>,

        /// New note; pass an empty string to clear it
        #[arg(long = "obs")]
        observation: Option<String>,
    },

    /// Toggle an item between pending and paid
    Toggle {
        /// Item to toggle (name or id)
        item: String,
    },

    /// Delete an item
    Del {
        /// Item to delete (name or id)
        item: String,
    },

    /// Show the active list grouped by category, with totals
    List {
        #[arg(long, help = "Include the archived category")]
        all: bool,
    },

    /// Show the list chat, or send a message
    Chat {
        #[arg(long, value_name = "TEXT", help = "Send a message to the list chat")]
        send: Option<String>,
    },

    /// Browse older (archived) lists
    Lists {
        #[arg(long, value_name = "LIST", help = "Show the items of one archived list (name or id)")]
        show: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category
    Add {
        /// Category name
        name: String,
    },

    /// Rename a category
    Rename {
        /// Category to rename (name or id)
        category: String,

        /// New name
        name: String,
    },

    /// Delete a category and every item in it
    Del {
        /// Category to delete (name or id)
        category: String,
    },
}
