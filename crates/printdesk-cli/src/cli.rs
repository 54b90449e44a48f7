use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "printdesk",
    about = "printdesk: print-shop job intake, docket numbers and paper compatibility",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to printdesk.toml (missing file means defaults)
    #[arg(long, global = true, default_value = "printdesk.toml")]
    pub config: String,

    /// Ledger JSONL path; overrides `store.ledger`
    #[arg(long, global = true)]
    pub ledger: Option<String>,

    /// Name of the acting user
    #[arg(long = "as-user", global = true, default_value = "admin")]
    pub as_user: String,

    /// Role of the acting user; omit for a user awaiting approval
    #[arg(long = "as-role", global = true)]
    pub as_role: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Docket number allocation
    Docket {
        #[command(subcommand)]
        command: DocketCommands,
    },

    /// Job status, payment and listing
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Paper catalog browsing and administration
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum DocketCommands {
    /// Allocate a docket number and record the job
    Allocate {
        /// Job type: local or foreign
        #[arg(long = "type", default_value = "local")]
        job_type: String,

        /// Docket number (FOREIGN jobs only)
        #[arg(long)]
        docket: Option<String>,

        /// Branch taking the order
        #[arg(long)]
        branch: String,

        /// Customer name
        #[arg(long)]
        customer: String,

        /// Product type ID
        #[arg(long = "product-type")]
        product_type: u64,

        /// Number of items
        #[arg(long)]
        quantity: u32,

        /// Print cost, e.g. 12.50
        #[arg(long = "print-cost")]
        print_cost: String,

        /// Design cost, e.g. 2.00
        #[arg(long = "design-cost", default_value = "0")]
        design_cost: String,

        /// Sales representative name (defaults to the acting user)
        #[arg(long = "sales-rep")]
        sales_rep: Option<String>,

        /// Who took the order (defaults to the acting user)
        #[arg(long = "order-taken-by")]
        order_taken_by: Option<String>,

        #[arg(long = "contact-person")]
        contact_person: String,

        #[arg(long)]
        mobile: String,

        #[arg(long, default_value = "")]
        email: String,

        /// What is being printed
        #[arg(long)]
        description: String,

        #[arg(long = "paper-type")]
        paper_type: Option<u64>,

        #[arg(long = "paper-weight")]
        paper_weight: Option<u64>,

        #[arg(long = "paper-size")]
        paper_size: Option<u64>,

        #[arg(long, default_value = "")]
        notes: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the next number without reserving it
    Peek {
        /// Job type: local or foreign
        #[arg(long = "type", default_value = "local")]
        job_type: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Realign the counter with dockets already in use
    Resync {
        /// Job type: local or foreign
        #[arg(long = "type", default_value = "local")]
        job_type: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum JobCommands {
    /// Show one job by ID or docket number
    Show {
        /// Job ID
        #[arg(required_unless_present = "docket", conflicts_with = "docket")]
        id: Option<u64>,

        /// Look the job up by docket number instead
        #[arg(long)]
        docket: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an unprinted job you took (any job for SUPERUSER)
    Edit {
        /// Job ID
        id: u64,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        customer: Option<String>,

        #[arg(long = "contact-person")]
        contact_person: Option<String>,

        #[arg(long)]
        mobile: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        quantity: Option<u32>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "product-type")]
        product_type: Option<u64>,

        #[arg(long = "paper-type")]
        paper_type: Option<u64>,

        #[arg(long = "paper-weight")]
        paper_weight: Option<u64>,

        #[arg(long = "paper-size")]
        paper_size: Option<u64>,

        #[arg(long)]
        notes: Option<String>,

        /// Print cost, e.g. 12.50
        #[arg(long = "print-cost")]
        print_cost: Option<String>,

        /// Design cost, e.g. 2.00
        #[arg(long = "design-cost")]
        design_cost: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List jobs visible to the acting user, newest first
    List {
        #[arg(long = "type")]
        job_type: Option<String>,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long = "payment-status")]
        payment_status: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a job's production status
    Status {
        /// Job ID
        id: u64,

        /// PENDING, PRINTED or CANCELLED
        status: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a job's payment status
    Payment {
        /// Job ID
        id: u64,

        /// NOT_MARKED, RECEIPTED or INVOICED
        status: String,

        /// Receipt or invoice reference
        #[arg(long, default_value = "")]
        reference: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Add a product type
    AddProductType {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a paper type
    AddPaperType {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a paper weight
    AddWeight {
        /// Grams per square meter
        gsm: u32,

        /// Compatible paper type IDs
        #[arg(long = "paper-type")]
        paper_types: Vec<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a paper size
    AddSize {
        name: String,

        /// A, B, NA or OTHER
        #[arg(long, default_value = "OTHER")]
        series: String,

        /// Width in millimeters
        #[arg(long)]
        width: String,

        /// Height in millimeters
        #[arg(long)]
        height: String,

        /// Compatible paper weight IDs
        #[arg(long = "weight")]
        weights: Vec<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Link a paper weight to a paper type
    LinkWeight {
        weight: u64,

        #[arg(long = "paper-type")]
        paper_type: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Link a paper size to a paper weight
    LinkSize {
        size: u64,

        #[arg(long)]
        weight: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a product type's specification override
    SetSpec {
        /// Product type ID
        product_type: u64,

        #[arg(long = "paper-type")]
        paper_types: Vec<u64>,

        #[arg(long = "weight")]
        weights: Vec<u64>,

        #[arg(long = "size")]
        sizes: Vec<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create or relabel the standard sheet sizes
    SeedSizes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Weights compatible with a paper type
    Weights {
        #[arg(long = "paper-type")]
        paper_type: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sizes compatible with a weight, or every size
    Sizes {
        #[arg(long)]
        weight: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Specification override for a product type
    Spec {
        /// Product type ID
        product_type: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find a sheet by dimensions or create it as a custom size
    CustomSize {
        #[arg(long)]
        width: String,

        #[arg(long)]
        height: String,

        #[arg(long)]
        weight: u64,

        #[arg(long, default_value = "")]
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
