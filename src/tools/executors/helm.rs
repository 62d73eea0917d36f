//! Helm release inspection

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::helm::{HelmClient, ReleaseRevision, ReleaseStatus};
use crate::tools::args::{ReleaseArgs, ReleaseHistoryArgs, ReleaseListArgs};
use crate::tools::dispatcher::DispatchError;
use crate::tools::executors::failed;
use crate::utils::tally;

/// Releases across all namespaces unless one is given; `status` matches case-insensitively
#[instrument(skip(helm), name = "execute_list_releases")]
pub async fn list_releases(helm: &dyn HelmClient, args: ReleaseListArgs) -> Result<Value, DispatchError> {
    let mut releases = helm
        .list_releases(args.namespace.as_deref())
        .await
        .map_err(|e| failed("list Helm releases", e))?;

    if let Some(status) = &args.status {
        releases.retain(|r| r.status.eq_ignore_ascii_case(status));
    }
    debug!(releases = releases.len(), "Listed Helm releases");

    let by_status = tally(releases.iter().map(|r| non_empty(&r.status, "unknown")));
    let by_namespace = tally(releases.iter().map(|r| non_empty(&r.namespace, "default")));

    let rows: Vec<Value> = releases
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "namespace": r.namespace,
                "status": r.status,
                "revision": r.revision,
                "chart": r.chart,
                "appVersion": r.app_version,
                "lastDeployed": r.updated,
            })
        })
        .collect();

    Ok(json!({
        "totalReleases": rows.len(),
        "releases": rows,
        "summary": { "byStatus": by_status, "byNamespace": by_namespace },
    }))
}

/// Status, values and manifest of one release
#[instrument(skip(helm, args), fields(release = %args.release_name, namespace = %args.namespace), name = "execute_get_release")]
pub async fn get_release(helm: &dyn HelmClient, args: ReleaseArgs) -> Result<Value, DispatchError> {
    let (name, namespace) = (args.release_name.as_str(), args.namespace.as_str());
    let (status, values, manifest) =
        tokio::try_join!(helm.status(name, namespace), helm.values(name, namespace), helm.manifest(name, namespace))
            .map_err(|e| failed("get Helm release", e))?;

    let summary = json!({
        "resourceCount": status.resource_count(),
        "hookCount": status.hooks.len(),
        "lastDeployed": status.info.last_deployed,
        "status": status.info.status,
    });

    Ok(json!({
        "releaseName": args.release_name,
        "namespace": args.namespace,
        "status": {
            "info": status.info,
            "hooks": status.hooks,
            "version": status.version,
            "namespace": status.namespace,
            "lastDeployed": status.info.last_deployed,
            "status": status.info.status,
        },
        "values": values,
        "manifest": manifest,
        "summary": summary,
    }))
}

#[instrument(skip(helm, args), fields(release = %args.release_name, namespace = %args.namespace), name = "execute_release_status")]
pub async fn release_status(helm: &dyn HelmClient, args: ReleaseArgs) -> Result<Value, DispatchError> {
    let status = helm
        .status(&args.release_name, &args.namespace)
        .await
        .map_err(|e| failed("get Helm release status", e))?;

    Ok(json!({
        "releaseName": args.release_name,
        "namespace": args.namespace,
        "status": status.info.status,
        "version": status.version,
        "lastDeployed": status.info.last_deployed,
        "statusNamespace": status.namespace,
        "info": {
            "firstDeployed": status.info.first_deployed,
            "description": status.info.description,
            "notes": status.info.notes,
        },
        "resources": resources(&status),
        "hooks": status.hooks,
        "summary": {
            "resourceCount": status.resource_count(),
            "hookCount": status.hooks.len(),
        },
    }))
}

/// Rendered resources flattened to `{ kind, name }` rows
fn resources(status: &ReleaseStatus) -> Vec<Value> {
    let Some(groups) = &status.info.resources else {
        return Vec::new();
    };
    groups
        .iter()
        .flat_map(|(group, objects)| {
            objects.iter().map(move |object| {
                json!({
                    "group": group,
                    "kind": object.get("kind"),
                    "name": object.pointer("/metadata/name"),
                })
            })
        })
        .collect()
}

#[instrument(skip(helm, args), fields(release = %args.release_name, namespace = %args.namespace, max = args.max), name = "execute_release_history")]
pub async fn release_history(helm: &dyn HelmClient, args: ReleaseHistoryArgs) -> Result<Value, DispatchError> {
    let history = helm
        .history(&args.release_name, &args.namespace, args.max)
        .await
        .map_err(|e| failed("get Helm release history", e))?;

    let with_status = |status: &str| history.iter().filter(|r| r.status == status).count();
    let current: Option<&ReleaseRevision> = history.iter().rev().find(|r| r.status == "deployed");

    let rows: Vec<Value> = history
        .iter()
        .map(|r| {
            json!({
                "revision": r.revision,
                "status": r.status,
                "chart": r.chart,
                "appVersion": r.app_version,
                "description": r.description,
                "updated": r.updated,
            })
        })
        .collect();

    Ok(json!({
        "releaseName": args.release_name,
        "namespace": args.namespace,
        "totalRevisions": history.len(),
        "currentRevision": current.map_or(0, |r| r.revision),
        "history": rows,
        "summary": {
            "totalRevisions": history.len(),
            "deployedRevisions": with_status("deployed"),
            "failedRevisions": with_status("failed"),
            "pendingRevisions": history.iter().filter(|r| r.status.starts_with("pending")).count(),
            "lastDeployed": current.map(|r| r.updated.as_str()),
        },
    }))
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
