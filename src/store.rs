use crate::error::CategoryError;
use crate::model::{CategoryFilter, Post, PostFields, PostId, Seed, NEW_POST_READ_TIME};

/// Numbers shown on the admin dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlogStats {
    pub posts: usize,
    pub categories: usize,
    pub admin_users: usize,
}

/// In-memory posts and categories.
///
/// Post ids are unique and category names are unique. Deleting a category
/// moves its posts to the fallback category, which is created on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlogStore {
    posts: Vec<Post>,
    categories: Vec<String>,
    fallback_category: String,
}

impl BlogStore {
    pub fn new(seed: Seed, fallback_category: impl Into<String>) -> Self {
        let mut categories: Vec<String> = Vec::with_capacity(seed.categories.len());
        for name in seed.categories {
            if !categories.contains(&name) {
                categories.push(name);
            }
        }
        Self {
            posts: seed.posts,
            categories,
            fallback_category: fallback_category.into(),
        }
    }

    pub fn list(&self) -> &[Post] {
        &self.posts
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn fallback_category(&self) -> &str {
        &self.fallback_category
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn filter_by_category(&self, filter: &CategoryFilter) -> Vec<&Post> {
        self.posts.iter().filter(|p| filter.matches(p)).collect()
    }

    pub fn recent(&self, limit: usize) -> &[Post] {
        &self.posts[..limit.min(self.posts.len())]
    }

    pub fn stats(&self) -> BlogStats {
        BlogStats {
            posts: self.posts.len(),
            categories: self.categories.len(),
            admin_users: 1,
        }
    }

    pub fn next_id(&self) -> PostId {
        self.posts.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
    }

    /// Publishes a new post at the top of the list.
    pub fn create(&mut self, fields: PostFields) -> Post {
        let post = Post {
            id: self.next_id(),
            title: fields.title,
            excerpt: fields.excerpt,
            content: fields.content,
            category: fields.category,
            date: fields.date,
            read_time: NEW_POST_READ_TIME.to_string(),
        };
        self.posts.insert(0, post.clone());
        post
    }

    /// Returns false when no post has this id.
    pub fn update(&mut self, id: PostId, fields: PostFields) -> bool {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        post.title = fields.title;
        post.excerpt = fields.excerpt;
        post.content = fields.content;
        post.category = fields.category;
        post.date = fields.date;
        true
    }

    pub fn delete(&mut self, id: PostId) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.posts.len() != before
    }

    pub fn add_category(&mut self, name: &str) -> Result<String, CategoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if self.has_category(name) {
            return Err(CategoryError::Duplicate(name.to_string()));
        }
        self.categories.push(name.to_string());
        Ok(name.to_string())
    }

    /// Renames `old` and rewrites every post filed under it. Renaming onto an
    /// existing category merges the two.
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<String, CategoryError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if new == old {
            return Err(CategoryError::Unchanged(old.to_string()));
        }
        let Some(index) = self.categories.iter().position(|c| c == old) else {
            return Err(CategoryError::Unknown(old.to_string()));
        };

        for post in self.posts.iter_mut().filter(|p| p.category == old) {
            post.category = new.to_string();
        }
        if self.has_category(new) {
            self.categories.remove(index);
        } else {
            self.categories[index] = new.to_string();
        }
        Ok(new.to_string())
    }

    /// Removes `name` and returns how many posts were moved to the fallback
    /// category.
    pub fn delete_category(&mut self, name: &str) -> Result<usize, CategoryError> {
        let Some(index) = self.categories.iter().position(|c| c == name) else {
            return Err(CategoryError::Unknown(name.to_string()));
        };
        self.categories.remove(index);

        let mut moved = 0;
        if name != self.fallback_category {
            for post in self.posts.iter_mut().filter(|p| p.category == name) {
                post.category = self.fallback_category.clone();
                moved += 1;
            }
        }

        let fallback_in_use = self
            .posts
            .iter()
            .any(|p| p.category == self.fallback_category);
        let keep_fallback = name != self.fallback_category || fallback_in_use;
        if keep_fallback && !self.has_category(&self.fallback_category) {
            self.categories.push(self.fallback_category.clone());
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> BlogStore {
        BlogStore::new(Seed::bundled(), "Uncategorized")
    }

    fn fields(title: &str, category: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: category.to_string(),
            date: "2024-02-01".to_string(),
        }
    }

    fn ids(posts: &[&Post]) -> Vec<PostId> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn ids_keep_increasing_after_deletes() {
        let mut store = seeded();
        let a = store.create(fields("a", "Career"));
        assert_eq!(a.id, 4);
        assert!(store.delete(2));
        let b = store.create(fields("b", "Career"));
        assert_eq!(b.id, 5);
        assert!(store.delete(5));
        let c = store.create(fields("c", "Career"));
        assert_eq!(c.id, 5);

        let mut all: Vec<PostId> = store.list().iter().map(|p| p.id).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), store.list().len());
    }

    #[test]
    fn first_post_in_empty_store_gets_id_one() {
        let mut store = BlogStore::new(Seed::default(), "Uncategorized");
        assert_eq!(store.create(fields("first", "Career")).id, 1);
    }

    #[test]
    fn created_posts_go_first_with_new_label() {
        let mut store = seeded();
        let post = store.create(fields("fresh", "Learning"));
        assert_eq!(store.list()[0], post);
        assert_eq!(post.read_time, NEW_POST_READ_TIME);
    }

    #[test]
    fn filter_keeps_relative_order() {
        let store = seeded();
        assert_eq!(ids(&store.filter_by_category(&CategoryFilter::All)), vec![1, 2, 3]);
        let productivity = CategoryFilter::Named("Productivity".to_string());
        assert_eq!(ids(&store.filter_by_category(&productivity)), vec![1, 3]);
        let career = CategoryFilter::Named("Career".to_string());
        assert!(store.filter_by_category(&career).is_empty());
    }

    #[test]
    fn update_and_delete_of_missing_id_are_noops() {
        let mut store = seeded();
        let before = store.clone();
        assert!(!store.update(42, fields("ghost", "Career")));
        assert!(!store.delete(42));
        assert_eq!(store, before);
    }

    #[test]
    fn update_keeps_id_and_read_time() {
        let mut store = seeded();
        assert!(store.update(2, fields("Renamed", "Learning")));
        let post = store.get(2).unwrap();
        assert_eq!(post.title, "Renamed");
        assert_eq!(post.category, "Learning");
        assert_eq!(post.read_time, "7 min read");
        assert_eq!(store.list()[1].id, 2);
    }

    #[test]
    fn add_category_trims_and_rejects_empty_or_duplicate() {
        let mut store = seeded();
        assert_eq!(store.add_category("  Health  "), Ok("Health".to_string()));
        assert_eq!(store.add_category("   "), Err(CategoryError::EmptyName));
        assert_eq!(
            store.add_category("Career"),
            Err(CategoryError::Duplicate("Career".to_string()))
        );
        assert_eq!(store.categories().len(), 6);
    }

    #[test]
    fn rename_rewrites_posts_and_list() {
        let mut store = seeded();
        store.rename_category("Productivity", "Focus").unwrap();
        assert!(!store.has_category("Productivity"));
        assert_eq!(store.categories()[0], "Focus");
        let focus = CategoryFilter::Named("Focus".to_string());
        assert_eq!(ids(&store.filter_by_category(&focus)), vec![1, 3]);
        assert_eq!(store.get(2).unwrap().category, "Mental Health");
    }

    #[test]
    fn rename_rejects_empty_and_unchanged() {
        let mut store = seeded();
        let before = store.clone();
        assert_eq!(
            store.rename_category("Career", " "),
            Err(CategoryError::EmptyName)
        );
        assert_eq!(
            store.rename_category("Career", " Career "),
            Err(CategoryError::Unchanged("Career".to_string()))
        );
        assert_eq!(store, before);
    }

    #[test]
    fn rename_onto_existing_category_merges() {
        let mut store = seeded();
        store.rename_category("Mental Health", "Productivity").unwrap();
        let count = store
            .categories()
            .iter()
            .filter(|c| *c == "Productivity")
            .count();
        assert_eq!(count, 1);
        assert!(!store.has_category("Mental Health"));
        assert_eq!(store.get(2).unwrap().category, "Productivity");
    }

    #[test]
    fn delete_category_moves_posts_to_fallback_once() {
        let mut store = seeded();
        let moved = store.delete_category("Productivity").unwrap();
        assert_eq!(moved, 2);
        assert_eq!(store.get(1).unwrap().category, "Uncategorized");
        assert_eq!(store.get(3).unwrap().category, "Uncategorized");
        assert_eq!(store.get(2).unwrap().category, "Mental Health");
        assert_eq!(
            store.categories(),
            ["Mental Health", "Self-Reflection", "Learning", "Career", "Uncategorized"]
        );

        store.delete_category("Mental Health").unwrap();
        let fallback_entries = store
            .categories()
            .iter()
            .filter(|c| *c == "Uncategorized")
            .count();
        assert_eq!(fallback_entries, 1);
    }

    #[test]
    fn deleting_unused_fallback_removes_it() {
        let mut store = seeded();
        store.add_category("Uncategorized").unwrap();
        store.delete_category("Uncategorized").unwrap();
        assert!(!store.has_category("Uncategorized"));
    }

    #[test]
    fn deleting_fallback_in_use_keeps_it() {
        let mut store = seeded();
        store.delete_category("Mental Health").unwrap();
        store.delete_category("Uncategorized").unwrap();
        assert!(store.has_category("Uncategorized"));
        assert_eq!(store.get(2).unwrap().category, "Uncategorized");
    }

    #[test]
    fn stats_and_recent() {
        let store = seeded();
        assert_eq!(
            store.stats(),
            BlogStats {
                posts: 3,
                categories: 5,
                admin_users: 1
            }
        );
        assert_eq!(store.recent(2).len(), 2);
        assert_eq!(store.recent(10).len(), 3);
    }
}
