//! Tantivy-based search index module.
//!
//! Provides full-text search capabilities for events with field boosting.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Event;

/// Field boost values: event names matter most, then where, then what.
const BOOST_NAME: f32 = 10.0;
const BOOST_LOCATION: f32 = 6.0;
const BOOST_DESCRIPTION: f32 = 4.0;

/// Search result with event and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub event_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    event_id: Field,
    name: Field,
    location: Field,
    description: Field,
}

/// Tantivy search index for events.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let mut schema_builder = Schema::builder();
        let event_id = schema_builder.add_text_field("event_id", STORED);
        let name = schema_builder.add_text_field("name", TEXT | STORED);
        let location = schema_builder.add_text_field("location", TEXT);
        let description = schema_builder.add_text_field("description", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            event_id,
            name,
            location,
            description,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from events.
    pub async fn rebuild(&self, events: &[Event]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;

        for event in events {
            writer.add_document(self.create_document(event))?;
        }

        writer.commit()?;

        // Reload reader to see new documents
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} events", events.len());
        Ok(())
    }

    /// Index a single event, replacing any previous version of it.
    pub async fn index_event(&self, event: &Event) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.event_id, &event.id);
        writer.delete_term(term);

        writer.add_document(self.create_document(event))?;
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Remove an event from the index.
    pub async fn remove_event(&self, event_id: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        let term = tantivy::Term::from_field_text(self.fields.event_id, event_id);
        writer.delete_term(term);
        writer.commit()?;

        self.reader.reload()?;

        Ok(())
    }

    /// Search for events matching the query.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let query_parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.name, self.fields.location, self.fields.description],
        );

        let base_query = query_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        // Re-parse per field so each can carry its own boost
        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();

        let field_queries = [
            (self.fields.name, BOOST_NAME),
            (self.fields.location, BOOST_LOCATION),
            (self.fields.description, BOOST_DESCRIPTION),
        ];

        for (field, boost) in field_queries {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                let boosted = BoostQuery::new(field_query, boost);
                subqueries.push((Occur::Should, Box::new(boosted)));
            }
        }

        // Combine with OR semantics
        let combined_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(limit + offset))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let event_id = doc.get_first(self.fields.event_id)?.as_str()?.to_string();
                Some(SearchResult { event_id, score })
            })
            .collect();

        Ok(results)
    }

    /// Create a Tantivy document from an event.
    fn create_document(&self, event: &Event) -> TantivyDocument {
        doc!(
            self.fields.event_id => event.id.clone(),
            self.fields.name => event.name.clone(),
            self.fields.location => event.location.clone(),
            self.fields.description => event.description.clone()
        )
    }
}
