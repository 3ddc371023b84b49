//! High-level page operations
//!
//! Thin wrappers that translate page-level intent (save, move, delete,
//! protect, review, raw content fetch, namespace discovery) into parameter
//! sets for the request layer. State-mutating calls carry the session's
//! csrf edit token.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::params::ParamList;
use crate::types::{Action, CreateFlags, MinorFlags, Protection, QueryBy, SaveFlags, WatchFlags};

use super::Client;

/// Optional knobs for [`Client::save_with`]
#[derive(Clone, Debug, Default)]
pub struct SaveOptions {
    /// Section to replace (only meaningful for [`SaveFlags::Replace`])
    pub section: String,
    /// Minor-edit marker
    pub minor: MinorFlags,
    /// Page-creation constraint
    pub create: CreateFlags,
    /// Watchlist behavior
    pub watch: WatchFlags,
    /// How the text relates to the existing page content
    pub mode: SaveFlags,
    /// Mark the edit with the bot flag
    pub bot: bool,
    /// Timestamp of the base revision, for edit-conflict detection
    pub basetimestamp: String,
    /// Timestamp when the editing process started
    pub starttimestamp: String,
}

impl Client {
    /// Load a page's raw wikitext through the non-API raw endpoint.
    ///
    /// Returns [`Error::PageNotFound`] when the page does not exist.
    pub async fn load_text(&mut self, title: &str) -> Result<String> {
        if title.is_empty() {
            return Err(Error::InvalidArgument("title shouldn't be empty".to_string()));
        }
        let mut url = self.index_url.clone();
        url.query_pairs_mut()
            .append_pair("title", title)
            .append_pair("redirect", "no")
            .append_pair("action", "raw")
            .append_pair("ctype", "text/plain")
            .append_pair("dontcountme", "1");
        self.make_raw_request(url, title).await
    }

    /// Replace a page's text, returning the new revision id when the
    /// server reports one.
    pub async fn save(&mut self, title: &str, text: &str, summary: &str) -> Result<Option<String>> {
        self.save_with(title, text, summary, &SaveOptions::default())
            .await
    }

    /// Replace one section's text
    pub async fn save_section(
        &mut self,
        title: &str,
        section: &str,
        text: &str,
        summary: &str,
    ) -> Result<Option<String>> {
        if section.is_empty() {
            return Err(Error::InvalidArgument("section shouldn't be empty".to_string()));
        }
        let options = SaveOptions {
            section: section.to_string(),
            ..Default::default()
        };
        self.save_with(title, text, summary, &options).await
    }

    /// Append text to an existing page
    pub async fn append(&mut self, title: &str, text: &str, summary: &str) -> Result<Option<String>> {
        let options = SaveOptions {
            mode: SaveFlags::Append,
            create: CreateFlags::NoCreate,
            bot: true,
            ..Default::default()
        };
        self.save_with(title, text, summary, &options).await
    }

    /// Prepend text to an existing page
    pub async fn prepend(&mut self, title: &str, text: &str, summary: &str) -> Result<Option<String>> {
        let options = SaveOptions {
            mode: SaveFlags::Prepend,
            create: CreateFlags::NoCreate,
            bot: true,
            ..Default::default()
        };
        self.save_with(title, text, summary, &options).await
    }

    /// Create a page that must not exist yet
    pub async fn create(&mut self, title: &str, text: &str, summary: &str) -> Result<Option<String>> {
        let options = SaveOptions {
            create: CreateFlags::CreateOnly,
            bot: true,
            ..Default::default()
        };
        self.save_with(title, text, summary, &options).await
    }

    /// Save with full control over edit flags.
    ///
    /// Fetches a fresh csrf token for the page before editing.
    pub async fn save_with(
        &mut self,
        title: &str,
        text: &str,
        summary: &str,
        options: &SaveOptions,
    ) -> Result<Option<String>> {
        if title.is_empty() {
            return Err(Error::InvalidArgument("title shouldn't be empty".to_string()));
        }
        let token = self.fetch_edit_token(title).await?;
        if token.is_empty() {
            return Err(Error::InvalidArgument("token shouldn't be empty".to_string()));
        }

        let mut params = ParamList::new();
        params.add("title", title)?;
        params.add("token", token)?;
        if options.mode == SaveFlags::Replace && !options.section.is_empty() {
            params.add("section", options.section.as_str())?;
        }
        match options.minor {
            MinorFlags::None => {}
            MinorFlags::Minor => params.add_flag("minor")?,
            MinorFlags::NotMinor => params.add_flag("notminor")?,
        }
        match options.create {
            CreateFlags::None => {}
            CreateFlags::NoCreate => params.add_flag("nocreate")?,
            CreateFlags::CreateOnly => params.add_flag("createonly")?,
            CreateFlags::Recreate => params.add_flag("recreate")?,
        }
        match options.watch {
            WatchFlags::None => {}
            WatchFlags::Watch => params.add("watchlist", "watch")?,
            WatchFlags::Unwatch => params.add("watchlist", "unwatch")?,
            WatchFlags::NoChange => params.add("watchlist", "nochange")?,
        }
        match options.mode {
            SaveFlags::Replace => params.add("text", text)?,
            SaveFlags::Append => params.add("appendtext", text)?,
            SaveFlags::Prepend => params.add("prependtext", text)?,
        }
        if options.bot {
            params.add_flag("bot")?;
        }
        if !options.basetimestamp.is_empty() {
            params.add("basetimestamp", options.basetimestamp.as_str())?;
        }
        if !options.starttimestamp.is_empty() {
            params.add("starttimestamp", options.starttimestamp.as_str())?;
        }
        if !summary.is_empty() {
            params.add("summary", summary)?;
        }

        let doc = self.make_request(Action::Edit, &params).await?;
        Ok(doc
            .find("edit")
            .and_then(|node| node.attr("newrevid"))
            .map(str::to_string))
    }

    /// Rename a page, moving its talk page along and leaving a redirect
    pub async fn move_page(&mut self, from: &str, to: &str, reason: &str) -> Result<()> {
        self.move_page_with(from, to, reason, true, false).await
    }

    /// Rename a page with explicit talk-page and redirect policies
    pub async fn move_page_with(
        &mut self,
        from: &str,
        to: &str,
        reason: &str,
        move_talk: bool,
        no_redirect: bool,
    ) -> Result<()> {
        if from.is_empty() || to.is_empty() {
            return Err(Error::InvalidArgument("title shouldn't be empty".to_string()));
        }
        let token = self.require_token()?;
        let mut params = ParamList::new();
        params.add("from", from)?;
        params.add("to", to)?;
        params.add("token", token)?;
        if !reason.is_empty() {
            params.add("reason", reason)?;
        }
        if move_talk {
            params.add_flag("movetalk")?;
        }
        if no_redirect {
            params.add_flag("noredirect")?;
        }
        self.make_request(Action::Move, &params).await?;
        Ok(())
    }

    /// Delete a page
    pub async fn delete(&mut self, title: &str, reason: &str) -> Result<()> {
        if title.is_empty() {
            return Err(Error::InvalidArgument("title shouldn't be empty".to_string()));
        }
        let token = self.require_token()?;
        let mut params = ParamList::new();
        params.add("title", title)?;
        params.add("token", token)?;
        if !reason.is_empty() {
            params.add("reason", reason)?;
        }
        self.make_request(Action::Delete, &params).await?;
        Ok(())
    }

    /// Apply protection levels to a page
    pub async fn protect(
        &mut self,
        title: &str,
        protections: &[Protection],
        reason: &str,
        cascade: bool,
    ) -> Result<()> {
        if title.is_empty() {
            return Err(Error::InvalidArgument("title shouldn't be empty".to_string()));
        }
        let token = self.require_token()?;
        let levels: Vec<String> = protections.iter().map(Protection::to_string).collect();
        let expiries: Vec<&str> = protections.iter().map(|p| p.expiry.as_str()).collect();
        let mut params = ParamList::new();
        params.add("title", title)?;
        params.add("token", token)?;
        params.add("protections", levels.join("|"))?;
        params.add("expiry", expiries.join("|"))?;
        if !reason.is_empty() {
            params.add("reason", reason)?;
        }
        if cascade {
            params.add_flag("cascade")?;
        }
        self.make_request(Action::Protect, &params).await?;
        Ok(())
    }

    /// Remove edit and move protection from a page
    pub async fn unprotect(&mut self, title: &str, reason: &str) -> Result<()> {
        use crate::types::UserGroup;
        let protections = [
            Protection::new(Action::Edit, UserGroup::None),
            Protection::new(Action::Move, UserGroup::None),
        ];
        self.protect(title, &protections, reason, false).await
    }

    /// Flag a revision as reviewed
    pub async fn review(&mut self, revision_id: &str, accuracy: &str, comment: &str) -> Result<()> {
        if revision_id.is_empty() {
            return Err(Error::InvalidArgument("revision id shouldn't be empty".to_string()));
        }
        let token = self.require_token()?;
        let mut params = ParamList::new();
        params.add("revid", revision_id)?;
        params.add("token", token)?;
        params.add("flag_accuracy", accuracy)?;
        if !comment.is_empty() {
            params.add("comment", comment)?;
        }
        self.make_request(Action::Review, &params).await?;
        Ok(())
    }

    /// Fetch the wiki's namespace table and cache it on the client.
    ///
    /// Only real namespaces (id > 0) are kept; the main namespace has no
    /// prefix and needs no entry.
    pub async fn fetch_namespaces(&mut self) -> Result<()> {
        let mut params = ParamList::new();
        params.add("meta", "siteinfo")?;
        params.add("siprop", "namespaces")?;
        let doc = self.enumerate(&params, true).await?;

        self.namespaces.clear();
        if let Some(namespaces) = doc.find("namespaces") {
            for ns in namespaces.children_named("ns") {
                let Some(id) = ns.attr("id").and_then(|id| id.parse::<i32>().ok()) else {
                    continue;
                };
                if id > 0 && !ns.text.is_empty() {
                    self.namespaces.insert(ns.text.clone(), id);
                }
            }
        }
        tracing::debug!(count = self.namespaces.len(), "namespace table refreshed");
        Ok(())
    }

    /// The namespace number a title belongs to, 0 (main) when no cached
    /// prefix matches
    pub fn page_namespace(&self, title: &str) -> i32 {
        for (name, id) in &self.namespaces {
            if title.len() > name.len()
                && title.starts_with(name.as_str())
                && title[name.len()..].starts_with(':')
            {
                return *id;
            }
        }
        0
    }

    /// The cached name of a namespace number
    pub fn namespace_name(&self, id: i32) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(_, ns)| **ns == id)
            .map(|(name, _)| name.as_str())
    }

    /// Serialize the namespace table through the cache codec
    pub fn namespaces_to_bytes(&self) -> Vec<u8> {
        let mut serializer = crate::codec::Serializer::new();
        serializer.put_i32(self.namespaces.len() as i32);
        for (name, id) in &self.namespaces {
            serializer.put_str(name);
            serializer.put_i32(*id);
        }
        serializer.into_bytes()
    }

    /// Replace the namespace table from a cache codec blob
    pub fn load_namespaces(&mut self, data: &[u8]) -> Result<()> {
        let mut deserializer = crate::codec::Deserializer::new(data);
        let count = deserializer.get_i32()?;
        let mut namespaces = std::collections::BTreeMap::new();
        for _ in 0..count {
            let name = deserializer.get_str()?;
            let id = deserializer.get_i32()?;
            namespaces.insert(name, id);
        }
        self.namespaces = namespaces;
        Ok(())
    }

    async fn fetch_edit_token(&mut self, title: &str) -> Result<String> {
        let mut params = ParamList::new();
        params.add("meta", "tokens")?;
        params.add("type", "csrf")?;
        let doc = self.query(QueryBy::Titles, &params, [title]).await?;
        Ok(token_from(&doc))
    }

    fn require_token(&self) -> Result<String> {
        let token = self.session.token();
        if token.is_empty() {
            return Err(Error::InvalidArgument("token shouldn't be empty".to_string()));
        }
        Ok(token.to_string())
    }
}

fn token_from(doc: &Document) -> String {
    doc.find("tokens")
        .and_then(|node| node.attr("csrftoken"))
        .unwrap_or_default()
        .to_string()
}
