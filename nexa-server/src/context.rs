//! The authenticated caller, injected into each GraphQL request's context
//! data by the `/graphql` handler before `schema.execute` runs, mirroring
//! how `routes::manage::info` resolves identity for the plain HTTP side.

use async_graphql::{Context, Error};
use nexa_model::prelude::*;

#[derive(Clone)]
pub struct Viewer {
    pub user: User,
    pub session: Session,
}

impl Viewer {
    pub fn require<'a>(ctx: &'a Context<'a>, policy: AuthorizationPolicy) -> async_graphql::Result<&'a Viewer> {
        let viewer = ctx.data::<Viewer>().map_err(|_| Error::new("authentication required"))?;
        if !policy.permits(&viewer.user) {
            return Err(Error::new("administrator privileges required"));
        }
        Ok(viewer)
    }
}
