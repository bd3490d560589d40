//! `ocl-dict list`: list a user's personal and organisation dictionaries.
//!
//! Without `--org`, the organisation listing covers every organisation the user
//! belongs to.
//!
//! ```bash
//! ocl-dict list --user admin
//! ocl-dict list --user admin --org PIH --q malaria --limit 50
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::Session;
use crate::api::{ApiDictionary, ListQuery};
use crate::orchestrator::ListingRequest;
use crate::store::{ActionKey, ActionType, Listing};

#[derive(Args, Debug)]
pub struct ListCommand {
    /// User whose dictionaries to list
    #[arg(long)]
    user: String,

    /// Only list dictionaries of this organisation
    #[arg(long)]
    org: Option<String>,

    /// Search text
    #[arg(long, default_value = "")]
    q: String,

    /// Results per listing
    #[arg(long, default_value_t = 20)]
    limit: u32,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl ListCommand {
    fn requests(&self) -> (ListingRequest, ListingRequest) {
        let query = ListQuery {
            q: self.q.clone(),
            limit: self.limit,
            page: self.page,
        };
        let user = self.user.trim_matches('/');
        let personal = ListingRequest::new(format!("/users/{user}/collections/"));
        let organisation = match &self.org {
            Some(org) => ListingRequest::new(format!("/orgs/{}/collections/", org.trim_matches('/'))),
            None => ListingRequest::new(format!("/users/{user}/orgs/collections/")),
        };
        (personal.with_query(query.clone()), organisation.with_query(query))
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let session = Session::open(cli).await?;
        self.execute_with(&session).await
    }

    pub(crate) async fn execute_with(self, session: &Session) -> Result<()> {
        let (personal, organisation) = self.requests();
        let succeeded = session
            .with_progress(session.orchestrator.retrieve_dictionaries(&personal, &organisation))
            .await;

        print_listing("Personal dictionaries", &session.state.listing(Listing::Personal));
        print_listing("Organisation dictionaries", &session.state.listing(Listing::Organisation));

        if !succeeded {
            // Report the first listing that failed; the other one was still printed
            for index in [0, 1] {
                let key = ActionKey::new(ActionType::RetrieveDictionaries, index);
                if let Some(failure) = session.state.failure(key) {
                    return Err(failure.to_error().into());
                }
            }
        }
        Ok(())
    }
}

fn print_listing(title: &str, dictionaries: &[ApiDictionary]) {
    println!("{}", title.bold());
    if dictionaries.is_empty() {
        println!("  {}", "none".dimmed());
        return;
    }
    for dictionary in dictionaries {
        println!(
            "  {:<12} {:<32} {}",
            dictionary.short_code.as_deref().unwrap_or(&dictionary.id),
            dictionary.name,
            dictionary.url.dimmed()
        );
    }
}
