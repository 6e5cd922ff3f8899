//! Step templates
//!
//! The onboarding workflow as data. Each entry names the tool a step runs,
//! its argument template, where it runs and what it mounts; the compiler
//! turns the table into concrete steps. Adding or removing a step is an
//! edit to [`STEP_TEMPLATES`].

/// Volume holding the cloned repository, shared by all working steps
pub const WORKSPACE_VOLUME: &str = "repo";

/// Read-only volume carrying TLS roots for git access
pub const TRUST_VOLUME: &str = "certs";

/// Name of the always-succeeding completion step
pub const TERMINAL_STEP: &str = "job-complete";

/// Bumped whenever the table changes shape; recorded as a pipeline label
pub const TEMPLATE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Git,
    Generator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkDir {
    /// Workspace mount root
    Workspace,
    /// Cloned repository
    Repository,
    /// Generator base directory
    Generator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mounts {
    Workspace,
    /// Workspace plus trust material, when configured
    WorkspaceAndTrust,
}

/// Request field substituted into a generator flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cluster,
    BuildNumber,
    Name,
    Owner,
    Team,
    Email,
    Service,
    Application,
    Domain,
    NamespaceVip,
    SnatIp,
    Cpu,
    Memory,
}

/// Commit identity setting applied on clone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Email,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Lit(&'static str),
    /// `<name>-onboarding`
    Branch,
    /// Authenticated https URL built from the credential env keys
    CloneUrl,
    /// Clone target directory
    RepoName,
    /// `<key>=<value>` for a git `--config` option
    Identity(&'static str, Identity),
    /// `--<flag>=<value>`, empty value when the field is absent
    Flag(&'static str, Field),
}

#[derive(Debug, Clone, Copy)]
pub struct StepTemplate {
    pub name: &'static str,
    pub tool: Tool,
    pub args: &'static [Arg],
    pub working_dir: WorkDir,
    pub mounts: Mounts,
    /// Injects the git credential bundle
    pub credentials: bool,
}

pub const STEP_TEMPLATES: [StepTemplate; 6] = [
    StepTemplate {
        name: "step-1-clone-repo",
        tool: Tool::Git,
        args: &[
            Arg::Lit("clone"),
            Arg::Lit("--config"),
            Arg::Identity("user.email", Identity::Email),
            Arg::Lit("--config"),
            Arg::Identity("user.name", Identity::Name),
            Arg::CloneUrl,
            Arg::RepoName,
        ],
        working_dir: WorkDir::Workspace,
        mounts: Mounts::WorkspaceAndTrust,
        credentials: true,
    },
    StepTemplate {
        name: "step-2-checkout-branch",
        tool: Tool::Git,
        args: &[Arg::Lit("checkout"), Arg::Lit("-b"), Arg::Branch],
        working_dir: WorkDir::Repository,
        mounts: Mounts::Workspace,
        credentials: false,
    },
    StepTemplate {
        name: "step-3-add-project",
        tool: Tool::Generator,
        args: &[
            Arg::Lit("create"),
            Arg::Flag("cluster", Field::Cluster),
            Arg::Flag("buildnumber", Field::BuildNumber),
            Arg::Flag("name", Field::Name),
            Arg::Flag("owner", Field::Owner),
            Arg::Flag("team", Field::Team),
            Arg::Flag("email", Field::Email),
            Arg::Flag("service", Field::Service),
            Arg::Flag("application", Field::Application),
            Arg::Flag("domain", Field::Domain),
            Arg::Flag("namespacevip", Field::NamespaceVip),
            Arg::Flag("snatip", Field::SnatIp),
            Arg::Flag("cpu", Field::Cpu),
            Arg::Flag("memory", Field::Memory),
        ],
        working_dir: WorkDir::Generator,
        mounts: Mounts::Workspace,
        credentials: false,
    },
    StepTemplate {
        name: "step-4-add-files",
        tool: Tool::Git,
        args: &[Arg::Lit("add"), Arg::Lit(".")],
        working_dir: WorkDir::Repository,
        mounts: Mounts::Workspace,
        credentials: false,
    },
    StepTemplate {
        name: "step-5-commit-changes",
        tool: Tool::Git,
        args: &[Arg::Lit("commit"), Arg::Lit("-m"), Arg::Branch],
        working_dir: WorkDir::Repository,
        mounts: Mounts::Workspace,
        credentials: false,
    },
    StepTemplate {
        name: "step-6-push-changes",
        tool: Tool::Git,
        args: &[
            Arg::Lit("push"),
            Arg::Lit("-u"),
            Arg::Lit("origin"),
            Arg::Branch,
        ],
        working_dir: WorkDir::Repository,
        mounts: Mounts::WorkspaceAndTrust,
        credentials: true,
    },
];
