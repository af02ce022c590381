// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::infrastructure::constants::{
    DEFAULT_TIMEOUT_SECONDS, K8S_TIMEOUT_SECONDS, STATE_ACTIVE, STATE_AVAILABLE, STATE_READY,
};
use crate::shared::{CloudError, Result};
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Datacenter,
    Location,
    Request,
    K8sCluster,
    K8sNodePool,
    K8sNode,
    Snapshot,
    Label,
    Pcc,
    User,
    Group,
    Share,
    BackupUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    List,
    Get,
    Create,
    Update,
    Delete,
    Wait,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::List => "list",
            Verb::Get => "get",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::Wait => "wait",
        };
        f.write_str(name)
    }
}

/// How completion of a mutating call is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// The API returns a request handle in the `Location` header.
    Request,
    /// Only the resource's own `metadata.state` can be polled.
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Patch,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Plain,
    State,
    Timestamp,
}

/// A printable column: header plus JSON pointer into the API object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub pointer: &'static str,
    pub format: CellFormat,
}

const fn col(header: &'static str, pointer: &'static str) -> Column {
    Column {
        header,
        pointer,
        format: CellFormat::Plain,
    }
}

const fn state_col(header: &'static str, pointer: &'static str) -> Column {
    Column {
        header,
        pointer,
        format: CellFormat::State,
    }
}

const fn time_col(header: &'static str, pointer: &'static str) -> Column {
    Column {
        header,
        pointer,
        format: CellFormat::Timestamp,
    }
}

const STATE: Column = state_col("State", "/metadata/state");
const NAME: Column = col("Name", "/properties/name");

const DATACENTER_COLUMNS: &[Column] = &[
    col("DatacenterId", "/id"),
    NAME,
    col("Location", "/properties/location"),
    col("Description", "/properties/description"),
    col("Version", "/properties/version"),
    STATE,
];
const LOCATION_COLUMNS: &[Column] = &[
    col("LocationId", "/id"),
    NAME,
    col("Features", "/properties/features"),
];
const REQUEST_COLUMNS: &[Column] = &[
    col("RequestId", "/id"),
    time_col("CreatedDate", "/metadata/createdDate"),
    col("Method", "/properties/method"),
    col("Url", "/properties/url"),
    state_col("Status", "/metadata/requestStatus/metadata/status"),
];
const K8S_CLUSTER_COLUMNS: &[Column] = &[
    col("ClusterId", "/id"),
    NAME,
    col("K8sVersion", "/properties/k8sVersion"),
    STATE,
];
const K8S_NODEPOOL_COLUMNS: &[Column] = &[
    col("NodePoolId", "/id"),
    NAME,
    col("K8sVersion", "/properties/k8sVersion"),
    col("NodeCount", "/properties/nodeCount"),
    col("DatacenterId", "/properties/datacenterId"),
    STATE,
];
const K8S_NODE_COLUMNS: &[Column] = &[
    col("NodeId", "/id"),
    NAME,
    col("K8sVersion", "/properties/k8sVersion"),
    col("PublicIP", "/properties/publicIP"),
    col("PrivateIP", "/properties/privateIP"),
    STATE,
];
const SNAPSHOT_COLUMNS: &[Column] = &[
    col("SnapshotId", "/id"),
    NAME,
    col("Location", "/properties/location"),
    col("Size", "/properties/size"),
    col("LicenceType", "/properties/licenceType"),
    STATE,
];
const LABEL_COLUMNS: &[Column] = &[
    col("URN", "/id"),
    col("Key", "/properties/key"),
    col("Value", "/properties/value"),
    col("ResourceId", "/properties/resourceId"),
    col("ResourceType", "/properties/resourceType"),
];
const PCC_COLUMNS: &[Column] = &[
    col("PccId", "/id"),
    NAME,
    col("Description", "/properties/description"),
    STATE,
];
const USER_COLUMNS: &[Column] = &[
    col("UserId", "/id"),
    col("Firstname", "/properties/firstname"),
    col("Lastname", "/properties/lastname"),
    col("Email", "/properties/email"),
    col("Administrator", "/properties/administrator"),
    col("ForceSecAuth", "/properties/forceSecAuth"),
];
const GROUP_COLUMNS: &[Column] = &[
    col("GroupId", "/id"),
    NAME,
    col("CreateDataCenter", "/properties/createDataCenter"),
    col("CreateSnapshot", "/properties/createSnapshot"),
    col("CreatePcc", "/properties/createPcc"),
    col("CreateK8sCluster", "/properties/createK8sCluster"),
];
const SHARE_COLUMNS: &[Column] = &[
    col("ShareId", "/id"),
    col("EditPrivilege", "/properties/editPrivilege"),
    col("SharePrivilege", "/properties/sharePrivilege"),
];
const BACKUP_UNIT_COLUMNS: &[Column] = &[
    col("BackupUnitId", "/id"),
    NAME,
    col("Email", "/properties/email"),
    STATE,
];

const READ_ONLY: &[Verb] = &[Verb::List, Verb::Get];
const CRUD: &[Verb] = &[Verb::List, Verb::Get, Verb::Create, Verb::Update, Verb::Delete];
const CRUD_WAIT: &[Verb] = &[
    Verb::List,
    Verb::Get,
    Verb::Create,
    Verb::Update,
    Verb::Delete,
    Verb::Wait,
];

/// Parent identifiers needed by nested collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentIds {
    pub cluster_id: Option<String>,
    pub nodepool_id: Option<String>,
    pub group_id: Option<String>,
}

impl ParentIds {
    fn require<'a>(value: &'a Option<String>, flag: &str, kind: ResourceKind) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CloudError::validation(format!("{} is required for {}", flag, kind)))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::Datacenter,
        ResourceKind::Location,
        ResourceKind::Request,
        ResourceKind::K8sCluster,
        ResourceKind::K8sNodePool,
        ResourceKind::K8sNode,
        ResourceKind::Snapshot,
        ResourceKind::Label,
        ResourceKind::Pcc,
        ResourceKind::User,
        ResourceKind::Group,
        ResourceKind::Share,
        ResourceKind::BackupUnit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Datacenter => "datacenter",
            ResourceKind::Location => "location",
            ResourceKind::Request => "request",
            ResourceKind::K8sCluster => "k8s cluster",
            ResourceKind::K8sNodePool => "k8s nodepool",
            ResourceKind::K8sNode => "k8s node",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::Label => "label",
            ResourceKind::Pcc => "pcc",
            ResourceKind::User => "user",
            ResourceKind::Group => "group",
            ResourceKind::Share => "share",
            ResourceKind::BackupUnit => "backupunit",
        }
    }

    pub fn collection_path(&self, parents: &ParentIds) -> Result<String> {
        let path = match self {
            ResourceKind::Datacenter => "/datacenters".to_string(),
            ResourceKind::Location => "/locations".to_string(),
            ResourceKind::Request => "/requests".to_string(),
            ResourceKind::K8sCluster => "/k8s".to_string(),
            ResourceKind::K8sNodePool => format!(
                "/k8s/{}/nodepools",
                ParentIds::require(&parents.cluster_id, "--cluster-id", *self)?
            ),
            ResourceKind::K8sNode => format!(
                "/k8s/{}/nodepools/{}/nodes",
                ParentIds::require(&parents.cluster_id, "--cluster-id", *self)?,
                ParentIds::require(&parents.nodepool_id, "--nodepool-id", *self)?
            ),
            ResourceKind::Snapshot => "/snapshots".to_string(),
            ResourceKind::Label => "/labels".to_string(),
            ResourceKind::Pcc => "/pccs".to_string(),
            ResourceKind::User => "/um/users".to_string(),
            ResourceKind::Group => "/um/groups".to_string(),
            ResourceKind::Share => format!(
                "/um/groups/{}/shares",
                ParentIds::require(&parents.group_id, "--group-id", *self)?
            ),
            ResourceKind::BackupUnit => "/backupunits".to_string(),
        };
        Ok(path)
    }

    pub fn item_path(&self, parents: &ParentIds, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(CloudError::validation(format!("--id is required for {}", self)));
        }
        Ok(format!("{}/{}", self.collection_path(parents)?, id))
    }

    /// Shares are created on the shared resource's id rather than on the collection.
    pub fn create_path(&self, parents: &ParentIds, resource_id: Option<&str>) -> Result<String> {
        match (self, resource_id) {
            (ResourceKind::Share, Some(id)) => self.item_path(parents, id),
            (ResourceKind::Share, None) => Err(CloudError::validation(
                "--resource-id is required for share",
            )),
            _ => self.collection_path(parents),
        }
    }

    pub fn verbs(&self) -> &'static [Verb] {
        match self {
            ResourceKind::Location | ResourceKind::Label => READ_ONLY,
            ResourceKind::Request => &[Verb::List, Verb::Get, Verb::Wait],
            ResourceKind::K8sNode => &[Verb::List, Verb::Get, Verb::Delete, Verb::Wait],
            ResourceKind::Snapshot => &[
                Verb::List,
                Verb::Get,
                Verb::Update,
                Verb::Delete,
                Verb::Wait,
            ],
            ResourceKind::User | ResourceKind::Group | ResourceKind::Share => CRUD,
            ResourceKind::Datacenter
            | ResourceKind::K8sCluster
            | ResourceKind::K8sNodePool
            | ResourceKind::Pcc
            | ResourceKind::BackupUnit => CRUD_WAIT,
        }
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.verbs().contains(&verb)
    }

    pub fn ensure_supports(&self, verb: Verb) -> Result<()> {
        if self.supports(verb) {
            Ok(())
        } else {
            Err(CloudError::Unsupported(format!(
                "{} is not supported for {}",
                verb, self
            )))
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            ResourceKind::Datacenter => DATACENTER_COLUMNS,
            ResourceKind::Location => LOCATION_COLUMNS,
            ResourceKind::Request => REQUEST_COLUMNS,
            ResourceKind::K8sCluster => K8S_CLUSTER_COLUMNS,
            ResourceKind::K8sNodePool => K8S_NODEPOOL_COLUMNS,
            ResourceKind::K8sNode => K8S_NODE_COLUMNS,
            ResourceKind::Snapshot => SNAPSHOT_COLUMNS,
            ResourceKind::Label => LABEL_COLUMNS,
            ResourceKind::Pcc => PCC_COLUMNS,
            ResourceKind::User => USER_COLUMNS,
            ResourceKind::Group => GROUP_COLUMNS,
            ResourceKind::Share => SHARE_COLUMNS,
            ResourceKind::BackupUnit => BACKUP_UNIT_COLUMNS,
        }
    }

    /// State that means the resource finished provisioning.
    pub fn ready_state(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Datacenter
            | ResourceKind::Snapshot
            | ResourceKind::Pcc
            | ResourceKind::BackupUnit => Some(STATE_AVAILABLE),
            ResourceKind::K8sCluster | ResourceKind::K8sNodePool => Some(STATE_ACTIVE),
            ResourceKind::K8sNode => Some(STATE_READY),
            _ => None,
        }
    }

    pub fn tracking(&self) -> Tracking {
        if self.is_k8s() {
            Tracking::State
        } else {
            Tracking::Request
        }
    }

    pub fn update_method(&self) -> UpdateMethod {
        if self.is_k8s() {
            UpdateMethod::Put
        } else {
            UpdateMethod::Patch
        }
    }

    pub fn default_timeout(&self) -> Duration {
        if self.is_k8s() {
            Duration::from_secs(K8S_TIMEOUT_SECONDS)
        } else {
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
        }
    }

    pub fn create_body(&self, properties: Map<String, Value>) -> Value {
        json!({ "properties": properties })
    }

    pub fn update_body(&self, properties: Map<String, Value>) -> Value {
        match self.update_method() {
            UpdateMethod::Put => json!({ "properties": properties }),
            UpdateMethod::Patch => Value::Object(properties),
        }
    }

    fn is_k8s(&self) -> bool {
        matches!(
            self,
            ResourceKind::K8sCluster | ResourceKind::K8sNodePool | ResourceKind::K8sNode
        )
    }
}
