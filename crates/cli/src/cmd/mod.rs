mod info;
mod install;
mod run;
mod which;

pub use info::cmd_info;
pub use install::cmd_install;
pub use run::cmd_run;
pub use which::cmd_which;
