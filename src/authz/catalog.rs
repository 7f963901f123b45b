//! Closed catalog of permission strings and role identifiers.
//!
//! Every permission has the shape `<action>:<resource>` and belongs to exactly
//! one [`Module`]. Validity is always a membership test against this table;
//! nothing is inferred from the shape of a string.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::errors::{AuthzError, AuthzResult};

/// Well-known permission strings
pub mod permissions {
    // Plant master
    pub const CREATE_PLANT: &str = "create:plant_master";
    pub const READ_PLANT: &str = "read:plant_master";
    pub const UPDATE_PLANT: &str = "update:plant_master";
    pub const DELETE_PLANT: &str = "delete:plant_master";
    pub const APPROVE_PLANT: &str = "approve:plant_master";

    // Department master
    pub const CREATE_DEPARTMENT: &str = "create:department_master";
    pub const READ_DEPARTMENT: &str = "read:department_master";
    pub const UPDATE_DEPARTMENT: &str = "update:department_master";
    pub const DELETE_DEPARTMENT: &str = "delete:department_master";
    pub const APPROVE_DEPARTMENT: &str = "approve:department_master";

    // Role master
    pub const CREATE_ROLE: &str = "create:role_master";
    pub const READ_ROLE: &str = "read:role_master";
    pub const UPDATE_ROLE: &str = "update:role_master";
    pub const DELETE_ROLE: &str = "delete:role_master";
    pub const APPROVE_ROLE: &str = "approve:role_master";

    // User master
    pub const CREATE_USER: &str = "create:user_master";
    pub const READ_USER: &str = "read:user_master";
    pub const UPDATE_USER: &str = "update:user_master";
    pub const DELETE_USER: &str = "delete:user_master";
    pub const APPROVE_USER: &str = "approve:user_master";
    pub const ASSIGN_USER: &str = "assign:user_master";

    // Application master
    pub const CREATE_APPLICATION: &str = "create:application_master";
    pub const READ_APPLICATION: &str = "read:application_master";
    pub const UPDATE_APPLICATION: &str = "update:application_master";
    pub const DELETE_APPLICATION: &str = "delete:application_master";
    pub const APPROVE_APPLICATION: &str = "approve:application_master";

    // Vendor master
    pub const CREATE_VENDOR: &str = "create:vendor_master";
    pub const READ_VENDOR: &str = "read:vendor_master";
    pub const UPDATE_VENDOR: &str = "update:vendor_master";
    pub const DELETE_VENDOR: &str = "delete:vendor_master";
    pub const APPROVE_VENDOR: &str = "approve:vendor_master";

    // Server inventory
    pub const CREATE_SERVER: &str = "create:server_master";
    pub const READ_SERVER: &str = "read:server_master";
    pub const UPDATE_SERVER: &str = "update:server_master";
    pub const DELETE_SERVER: &str = "delete:server_master";
    pub const APPROVE_SERVER: &str = "approve:server_master";

    // Network devices
    pub const CREATE_NETWORK: &str = "create:network_master";
    pub const READ_NETWORK: &str = "read:network_master";
    pub const UPDATE_NETWORK: &str = "update:network_master";
    pub const DELETE_NETWORK: &str = "delete:network_master";
    pub const APPROVE_NETWORK: &str = "approve:network_master";

    // Dashboard
    pub const VIEW_DASHBOARD: &str = "view:dashboard";
    pub const MANAGE_DASHBOARD: &str = "manage:dashboard";

    // Tasks
    pub const CREATE_TASK: &str = "create:task";
    pub const READ_TASK: &str = "read:task";
    pub const UPDATE_TASK: &str = "update:task";
    pub const DELETE_TASK: &str = "delete:task";
    pub const ASSIGN_TASK: &str = "assign:task";
    pub const COMPLETE_TASK: &str = "complete:task";

    // Reviewer queue
    pub const VIEW_REVIEWER: &str = "view:reviewer";
    pub const APPROVE_REVIEWER: &str = "approve:reviewer";

    // Task closure bin
    pub const VIEW_TASK_CLOSURE_BIN: &str = "view:task_closure_bin";
    pub const COMPLETE_TASK_CLOSURE_BIN: &str = "complete:task_closure_bin";

    // Approval workflow
    pub const VIEW_APPROVAL_WORKFLOW: &str = "view:approval_workflow";
    pub const MANAGE_APPROVAL_WORKFLOW: &str = "manage:approval_workflow";
    pub const APPROVE_APPROVAL_WORKFLOW: &str = "approve:approval_workflow";

    // Reports
    pub const VIEW_REPORT: &str = "view:report";
    pub const EXPORT_REPORT: &str = "export:report";
    pub const GENERATE_REPORT: &str = "generate:report";

    // Settings
    pub const VIEW_SETTINGS: &str = "view:settings";
    pub const MANAGE_SETTINGS: &str = "manage:settings";
}

use permissions::*;

/// Master-data domain a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Module {
    Plant,
    Department,
    Role,
    User,
    Application,
    Vendor,
    Server,
    Network,
    Dashboard,
    Task,
    Reviewer,
    TaskClosureBin,
    ApprovalWorkflow,
    Report,
    Settings,
}

impl Module {
    pub const ALL: [Module; 15] = [
        Module::Plant,
        Module::Department,
        Module::Role,
        Module::User,
        Module::Application,
        Module::Vendor,
        Module::Server,
        Module::Network,
        Module::Dashboard,
        Module::Task,
        Module::Reviewer,
        Module::TaskClosureBin,
        Module::ApprovalWorkflow,
        Module::Report,
        Module::Settings,
    ];

    /// Catalog key, also the `moduleId` carried by plant-scoped grants.
    pub fn key(&self) -> &'static str {
        match self {
            Module::Plant => "plant",
            Module::Department => "department",
            Module::Role => "role",
            Module::User => "user",
            Module::Application => "application",
            Module::Vendor => "vendor",
            Module::Server => "server",
            Module::Network => "network",
            Module::Dashboard => "dashboard",
            Module::Task => "task",
            Module::Reviewer => "reviewer",
            Module::TaskClosureBin => "task-closure-bin",
            Module::ApprovalWorkflow => "approval-workflow",
            Module::Report => "report",
            Module::Settings => "settings",
        }
    }

    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Module::Plant => &[CREATE_PLANT, READ_PLANT, UPDATE_PLANT, DELETE_PLANT, APPROVE_PLANT],
            Module::Department => &[
                CREATE_DEPARTMENT,
                READ_DEPARTMENT,
                UPDATE_DEPARTMENT,
                DELETE_DEPARTMENT,
                APPROVE_DEPARTMENT,
            ],
            Module::Role => &[CREATE_ROLE, READ_ROLE, UPDATE_ROLE, DELETE_ROLE, APPROVE_ROLE],
            Module::User => &[
                CREATE_USER,
                READ_USER,
                UPDATE_USER,
                DELETE_USER,
                APPROVE_USER,
                ASSIGN_USER,
            ],
            Module::Application => &[
                CREATE_APPLICATION,
                READ_APPLICATION,
                UPDATE_APPLICATION,
                DELETE_APPLICATION,
                APPROVE_APPLICATION,
            ],
            Module::Vendor => &[CREATE_VENDOR, READ_VENDOR, UPDATE_VENDOR, DELETE_VENDOR, APPROVE_VENDOR],
            Module::Server => &[CREATE_SERVER, READ_SERVER, UPDATE_SERVER, DELETE_SERVER, APPROVE_SERVER],
            Module::Network => &[
                CREATE_NETWORK,
                READ_NETWORK,
                UPDATE_NETWORK,
                DELETE_NETWORK,
                APPROVE_NETWORK,
            ],
            Module::Dashboard => &[VIEW_DASHBOARD, MANAGE_DASHBOARD],
            Module::Task => &[CREATE_TASK, READ_TASK, UPDATE_TASK, DELETE_TASK, ASSIGN_TASK, COMPLETE_TASK],
            Module::Reviewer => &[VIEW_REVIEWER, APPROVE_REVIEWER],
            Module::TaskClosureBin => &[VIEW_TASK_CLOSURE_BIN, COMPLETE_TASK_CLOSURE_BIN],
            Module::ApprovalWorkflow => &[
                VIEW_APPROVAL_WORKFLOW,
                MANAGE_APPROVAL_WORKFLOW,
                APPROVE_APPROVAL_WORKFLOW,
            ],
            Module::Report => &[VIEW_REPORT, EXPORT_REPORT, GENERATE_REPORT],
            Module::Settings => &[VIEW_SETTINGS, MANAGE_SETTINGS],
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Module {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|module| module.key() == value)
            .ok_or_else(|| AuthzError::unknown_module(value))
    }
}

/// Verb half of a permission string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Approve,
    Manage,
    View,
    Assign,
    Complete,
    Export,
    Generate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Manage => "manage",
            Action::View => "view",
            Action::Assign => "assign",
            Action::Complete => "complete",
            Action::Export => "export",
            Action::Generate => "generate",
        }
    }

    /// Plant-scoped grants only ever carry these four verbs.
    pub fn is_crud(&self) -> bool {
        matches!(self, Action::Create | Action::Read | Action::Update | Action::Delete)
    }

    /// Action named before the first `:` of a permission string.
    pub fn of_permission(permission: &str) -> Option<Action> {
        let (action, _) = permission.split_once(':')?;
        action.parse().ok()
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "create" => Action::Create,
            "read" => Action::Read,
            "update" => Action::Update,
            "delete" => Action::Delete,
            "approve" => Action::Approve,
            "manage" => Action::Manage,
            "view" => Action::View,
            "assign" => Action::Assign,
            "complete" => Action::Complete,
            "export" => Action::Export,
            "generate" => Action::Generate,
            _ => return Err(()),
        })
    }
}

/// Reserved role identifiers issued by the account backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    SuperAdmin,
    Approver,
    ItBin,
    User,
}

impl Role {
    pub const SUPER_ADMIN_ID: i64 = 1;

    pub fn id(&self) -> i64 {
        match self {
            Role::SuperAdmin => Self::SUPER_ADMIN_ID,
            Role::Approver => 2,
            Role::ItBin => 3,
            Role::User => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Role> {
        match id {
            1 => Some(Role::SuperAdmin),
            2 => Some(Role::Approver),
            3 => Some(Role::ItBin),
            4 => Some(Role::User),
            _ => None,
        }
    }
}

/// All permissions declared for the module with the given catalog key.
pub fn permissions_for_module(module: &str) -> AuthzResult<BTreeSet<&'static str>> {
    let module: Module = module.parse()?;
    Ok(module.permissions().iter().copied().collect())
}

fn flattened() -> &'static HashSet<&'static str> {
    static ALL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    ALL.get_or_init(|| {
        Module::ALL
            .iter()
            .flat_map(|module| module.permissions().iter().copied())
            .collect()
    })
}

/// Pure membership test against the flattened catalog.
pub fn is_valid_permission(candidate: &str) -> bool {
    flattened().contains(candidate)
}

/// Every catalog permission, in module order.
pub fn all_permissions() -> impl Iterator<Item = &'static str> {
    Module::ALL
        .into_iter()
        .flat_map(|module| module.permissions().iter().copied())
}
