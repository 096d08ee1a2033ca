//! Resource group lifetime for one run.
//!
//! A [`ResourceGroupScope`] only exists once the group was created, and
//! [`release`](ResourceGroupScope::release) consumes it, so the group is
//! deleted at most once and never when it was not created.

use crate::azure::ResourceManager;
use crate::error::{Error, Result};
use crate::models::ResourceGroup;
use std::fmt;

/// Advisory outcome of cleanup. Logged by `release`, never propagated.
#[derive(Debug)]
pub enum Cleanup {
    /// Nothing was created, nothing to delete.
    NotNeeded,
    /// The resource group with this name was deleted.
    Deleted(String),
    /// Deletion failed; resources may be left behind.
    Failed(Error),
}

impl Cleanup {
    pub fn is_failed(&self) -> bool {
        matches!(self, Cleanup::Failed(_))
    }
}

impl fmt::Display for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cleanup::NotNeeded => write!(f, "no clean up necessary"),
            Cleanup::Deleted(name) => write!(f, "deleted resource group {name}"),
            Cleanup::Failed(err) => write!(f, "clean up failed: {err}"),
        }
    }
}

/// A created resource group that still has to be deleted.
pub struct ResourceGroupScope {
    name: String,
    released: bool,
}

impl ResourceGroupScope {
    /// Create the resource group; the scope exists only if that succeeded.
    pub async fn acquire<A>(arm: &A, name: &str, group: &ResourceGroup) -> Result<Self>
    where
        A: ResourceManager + ?Sized,
    {
        log::info!("Creating resource group...");
        let created = arm.create_resource_group(name, group).await?;
        log::info!(
            "Created a resource group with name: {}",
            created.name.as_deref().unwrap_or(name)
        );
        Ok(ResourceGroupScope {
            name: name.to_string(),
            released: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delete the resource group. Errors are logged and returned as
    /// [`Cleanup::Failed`].
    pub async fn release<A>(mut self, arm: &A) -> Cleanup
    where
        A: ResourceManager + ?Sized,
    {
        self.released = true;
        log::info!("Deleting Resource Group...");
        match arm.delete_resource_group(&self.name).await {
            Ok(()) => {
                log::info!("Deleted Resource Group: {}", self.name);
                Cleanup::Deleted(self.name.clone())
            }
            Err(err) => {
                log::error!("Failed to delete Resource Group {}: {err}", self.name);
                Cleanup::Failed(err)
            }
        }
    }
}

impl Drop for ResourceGroupScope {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "Resource group {} was never released and may still exist",
                self.name
            );
        }
    }
}
