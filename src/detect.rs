use log::{debug, info};

use crate::error::Result;
use crate::server::types::{Build, BuildList, BuildType, InvestigationList};
use crate::server::BuildServerClient;

/// Investigation states that count as "someone owns this failure".
const CLOSED_STATES: [&str; 2] = ["TAKEN", "FIXED"];

const FAILED_BUILDS_PATH: &str = "/httpAuth/app/rest/builds/";
const FAILED_BUILDS_LOCATOR: &str = "locator=sinceBuild:(status:success)";

/// Walks the server's resource graph for one broken build to decide whether
/// a human has taken responsibility for the failure.
pub struct ResponsibilityResolver<'a> {
    client: &'a BuildServerClient,
}

impl<'a> ResponsibilityResolver<'a> {
    pub fn new(client: &'a BuildServerClient) -> Self {
        Self { client }
    }

    /// Resolve build -> build type -> investigations and report whether the
    /// first investigation is in a closed state (`TAKEN` or `FIXED`).
    ///
    /// The build resource itself must exist; a failed fetch there
    /// propagates. Every later hop is optional: a build without a
    /// configuration link, a configuration without an investigations link,
    /// or an empty investigation list all resolve to "not taken".
    pub async fn is_responsibility_taken(&self, build_href: &str) -> Result<bool> {
        let build: Build = self.client.query(build_href, None).await?;

        let type_name = build
            .build_type
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .unwrap_or("<unnamed configuration>")
            .to_string();

        if let Some(triggered) = &build.triggered {
            if triggered.trigger_type == "user" {
                let user = triggered
                    .user
                    .as_ref()
                    .and_then(|u| u.name.as_deref())
                    .unwrap_or("<unknown>");
                info!("{type_name} was broken by a build triggered by {user}");
            }
        }

        let Some(build_type_ref) = build.build_type else {
            debug!("{type_name}: no configuration link, treating as not taken");
            return Ok(false);
        };

        let build_type: BuildType = self.client.query(&build_type_ref.href, None).await?;

        let Some(investigations_ref) = build_type.investigations else {
            debug!("{type_name}: no investigations filed");
            return Ok(false);
        };

        let investigations: InvestigationList =
            self.client.query(&investigations_ref.href, None).await?;

        let Some(record) = investigations.investigations.first() else {
            debug!("{type_name}: investigation list is empty");
            return Ok(false);
        };

        let state = record.state.as_deref().unwrap_or("");
        if CLOSED_STATES.contains(&state) {
            info!(
                "{type_name}: responsibility taken by {} (state {state})",
                record.assignee_name().unwrap_or("<unassigned>")
            );
            Ok(true)
        } else {
            debug!("{type_name}: investigation state {state:?} does not close the failure");
            Ok(false)
        }
    }
}

/// Finds builds that are currently broken with nobody on the hook.
pub struct FailureDetector<'a> {
    client: &'a BuildServerClient,
}

impl<'a> FailureDetector<'a> {
    pub fn new(client: &'a BuildServerClient) -> Self {
        Self { client }
    }

    /// Query every build recorded since the most recent success and keep
    /// the ones whose failure nobody has taken responsibility for.
    ///
    /// The collection query is mandatory: if it fails there is no safe
    /// default and the error propagates to the cycle. An empty result
    /// means "no alert".
    pub async fn detect_unacknowledged_failures(&self) -> Result<Vec<String>> {
        let list: BuildList = self
            .client
            .query(FAILED_BUILDS_PATH, Some(FAILED_BUILDS_LOCATOR))
            .await?;

        info!("{} broken build(s) since last success", list.builds.len());

        let resolver = ResponsibilityResolver::new(self.client);
        let mut unacknowledged = Vec::new();
        for build in list.builds {
            if !resolver.is_responsibility_taken(&build.href).await? {
                unacknowledged.push(build.href);
            }
        }

        Ok(unacknowledged)
    }
}
