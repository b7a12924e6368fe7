//! Menu actions and which machine states offer them.

use std::fmt;

use super::status::MachineStatus;

/// One entry of the top-level menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LaunchServer,
    ShowRunCommand,
    ShowBenchCommand,
    ShowChatCommand,
    StopServer,
    RestartAccelerated,
    RestartDefault,
    ReinstallBinaries,
    UninstallBinaries,
    CheckStatus,
}

impl Action {
    /// Actions offered for a status, in presentation order. `CheckStatus` is
    /// always last.
    #[must_use]
    pub fn available(status: MachineStatus) -> Vec<Self> {
        let mut actions = match status {
            MachineStatus::NotInstalled => vec![Self::ReinstallBinaries],
            MachineStatus::AcceleratedRunning => vec![
                Self::LaunchServer,
                Self::ShowRunCommand,
                Self::ShowBenchCommand,
                Self::RestartDefault,
            ],
            MachineStatus::AcceleratedWithServer => vec![
                Self::ShowChatCommand,
                Self::StopServer,
                Self::RestartDefault,
            ],
            MachineStatus::UnacceleratedVfkit
            | MachineStatus::NotRunning
            | MachineStatus::UnacceleratedRunning => {
                vec![Self::RestartAccelerated, Self::UninstallBinaries]
            }
        };
        actions.push(Self::CheckStatus);
        actions
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LaunchServer => "Launch an API Remoting accelerated inference server",
            Self::ShowRunCommand => "Show the RamaLama model run command",
            Self::ShowBenchCommand => "Show the RamaLama benchmark command",
            Self::ShowChatCommand => "Show the RamaLama chat command",
            Self::StopServer => "Stop the API Remoting inference server",
            Self::RestartAccelerated => "Restart the Podman machine with API Remoting support",
            Self::RestartDefault => "Restart the Podman machine with the default configuration",
            Self::ReinstallBinaries => "Install the API Remoting binaries",
            Self::UninstallBinaries => "Uninstall the API Remoting binaries",
            Self::CheckStatus => "Check the Podman machine API Remoting status",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
