use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use super::{MemoryStore, Store};
use crate::core::AppError;
use crate::models::news::{NewNews, NewPromotion, News, Promotion};
use crate::models::search::{like_pattern, text_contains};

const NEWS_SELECT: &str =
    "SELECT id, title, content, image_url, created_date, publish_date, is_published, author FROM news";

const PROMOTION_SELECT: &str =
    "SELECT id, title, description, start_date, end_date, image_url, is_active, discount FROM promotions";

impl Store {
    /// Every news item, newest first by creation.
    pub async fn list_news(&self) -> Result<Vec<News>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, News>(&format!("{} ORDER BY created_date DESC, id DESC", NEWS_SELECT))
                    .fetch_all(pool)
                    .await
                    .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| {
                let mut news: Vec<News> = tables.news.values().cloned().collect();
                news.sort_by(|a, b| b.created_date.cmp(&a.created_date).then(b.id.cmp(&a.id)));
                news
            }),
        }
    }

    /// Published news, newest first by publish date.
    pub async fn list_published_news(&self, limit: Option<usize>) -> Result<Vec<News>, AppError> {
        match self {
            Store::MySql(pool) => fetch_published_news(pool, None, limit).await,
            Store::Memory(memory) => memory.published_news(None, limit),
        }
    }

    /// Published news whose title or content contains `term`.
    pub async fn search_published_news(&self, term: &str) -> Result<Vec<News>, AppError> {
        match self {
            Store::MySql(pool) => fetch_published_news(pool, Some(term), None).await,
            Store::Memory(memory) => memory.published_news(Some(term), None),
        }
    }

    pub async fn get_news(&self, id: i32) -> Result<Option<News>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, News>(&format!("{} WHERE id = ?", NEWS_SELECT))
                    .bind(id)
                    .fetch_optional(pool)
                    .await
                    .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| tables.news.get(id).cloned()),
        }
    }

    pub async fn create_news(&self, news: &NewNews) -> Result<News, AppError> {
        match self {
            Store::MySql(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO news (title, content, image_url, created_date, publish_date, is_published, author)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&news.title)
                .bind(&news.content)
                .bind(&news.image_url)
                .bind(news.created_date)
                .bind(news.publish_date)
                .bind(news.is_published)
                .bind(&news.author)
                .execute(pool)
                .await
                .map_err(AppError::db_error)?;
                Ok(news_row(result.last_insert_id() as i32, news))
            }
            Store::Memory(memory) => {
                memory.transaction(|tables| Ok(tables.news.insert_with(|id| news_row(id, news))))
            }
        }
    }

    /// Returns false when there is no such item.
    pub async fn update_news(&self, news: &News) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let result = sqlx::query(
                    r#"
                    UPDATE news
                    SET title = ?, content = ?, image_url = ?, publish_date = ?, is_published = ?, author = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&news.title)
                .bind(&news.content)
                .bind(&news.image_url)
                .bind(news.publish_date)
                .bind(news.is_published)
                .bind(&news.author)
                .bind(news.id)
                .execute(pool)
                .await
                .map_err(AppError::db_error)?;
                // MySQL reports zero affected rows for an unchanged row
                Ok(result.rows_affected() > 0 || self.get_news(news.id).await?.is_some())
            }
            Store::Memory(memory) => memory.transaction(|tables| match tables.news.get_mut(news.id) {
                Some(stored) => {
                    *stored = news.clone();
                    Ok(true)
                }
                None => Ok(false),
            }),
        }
    }

    pub async fn delete_news(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => delete_by_id(pool, "news", id).await,
            Store::Memory(memory) => memory.transaction(|tables| Ok(tables.news.remove(id).is_some())),
        }
    }

    /// Every promotion, latest start first.
    pub async fn list_promotions(&self) -> Result<Vec<Promotion>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, Promotion>(&format!(
                    "{} ORDER BY start_date DESC, id DESC",
                    PROMOTION_SELECT
                ))
                .fetch_all(pool)
                .await
                .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.promotions(|_| true, None),
        }
    }

    /// Active promotions that have not ended at `now`, latest start first.
    pub async fn list_visible_promotions(
        &self,
        now: NaiveDateTime,
        limit: Option<usize>,
    ) -> Result<Vec<Promotion>, AppError> {
        match self {
            Store::MySql(pool) => fetch_visible_promotions(pool, now, None, limit).await,
            Store::Memory(memory) => {
                memory.promotions(|promotion| promotion.is_publicly_visible(now), limit)
            }
        }
    }

    pub async fn search_visible_promotions(
        &self,
        term: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<Promotion>, AppError> {
        match self {
            Store::MySql(pool) => fetch_visible_promotions(pool, now, Some(term), None).await,
            Store::Memory(memory) => memory.promotions(
                |promotion| {
                    promotion.is_publicly_visible(now)
                        && (text_contains(&promotion.title, term)
                            || text_contains(&promotion.description, term))
                },
                None,
            ),
        }
    }

    pub async fn get_promotion(&self, id: i32) -> Result<Option<Promotion>, AppError> {
        match self {
            Store::MySql(pool) => {
                sqlx::query_as::<_, Promotion>(&format!("{} WHERE id = ?", PROMOTION_SELECT))
                    .bind(id)
                    .fetch_optional(pool)
                    .await
                    .map_err(AppError::db_error)
            }
            Store::Memory(memory) => memory.read(|tables| tables.promotions.get(id).cloned()),
        }
    }

    pub async fn create_promotion(&self, promotion: &NewPromotion) -> Result<Promotion, AppError> {
        match self {
            Store::MySql(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO promotions (title, description, start_date, end_date, image_url, is_active, discount)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&promotion.title)
                .bind(&promotion.description)
                .bind(promotion.start_date)
                .bind(promotion.end_date)
                .bind(&promotion.image_url)
                .bind(promotion.is_active)
                .bind(&promotion.discount)
                .execute(pool)
                .await
                .map_err(AppError::db_error)?;
                Ok(promotion_row(result.last_insert_id() as i32, promotion))
            }
            Store::Memory(memory) => memory.transaction(|tables| {
                Ok(tables
                    .promotions
                    .insert_with(|id| promotion_row(id, promotion)))
            }),
        }
    }

    /// Returns false when there is no such promotion.
    pub async fn update_promotion(&self, promotion: &Promotion) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => {
                let result = sqlx::query(
                    r#"
                    UPDATE promotions
                    SET title = ?, description = ?, start_date = ?, end_date = ?, image_url = ?, is_active = ?, discount = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&promotion.title)
                .bind(&promotion.description)
                .bind(promotion.start_date)
                .bind(promotion.end_date)
                .bind(&promotion.image_url)
                .bind(promotion.is_active)
                .bind(&promotion.discount)
                .bind(promotion.id)
                .execute(pool)
                .await
                .map_err(AppError::db_error)?;
                Ok(result.rows_affected() > 0 || self.get_promotion(promotion.id).await?.is_some())
            }
            Store::Memory(memory) => {
                memory.transaction(|tables| match tables.promotions.get_mut(promotion.id) {
                    Some(stored) => {
                        *stored = promotion.clone();
                        Ok(true)
                    }
                    None => Ok(false),
                })
            }
        }
    }

    pub async fn delete_promotion(&self, id: i32) -> Result<bool, AppError> {
        match self {
            Store::MySql(pool) => delete_by_id(pool, "promotions", id).await,
            Store::Memory(memory) => {
                memory.transaction(|tables| Ok(tables.promotions.remove(id).is_some()))
            }
        }
    }
}

fn news_row(id: i32, news: &NewNews) -> News {
    News {
        id,
        title: news.title.clone(),
        content: news.content.clone(),
        image_url: news.image_url.clone(),
        created_date: news.created_date,
        publish_date: news.publish_date,
        is_published: news.is_published,
        author: news.author.clone(),
    }
}

fn promotion_row(id: i32, promotion: &NewPromotion) -> Promotion {
    Promotion {
        id,
        title: promotion.title.clone(),
        description: promotion.description.clone(),
        start_date: promotion.start_date,
        end_date: promotion.end_date,
        image_url: promotion.image_url.clone(),
        is_active: promotion.is_active,
        discount: promotion.discount.clone(),
    }
}

async fn delete_by_id(pool: &MySqlPool, table: &str, id: i32) -> Result<bool, AppError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_published_news(
    pool: &MySqlPool,
    term: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<News>, AppError> {
    let pattern = term.map(like_pattern);
    let sql = format!(
        r#"{}
        WHERE is_published = TRUE
          AND (? IS NULL OR LOWER(title) LIKE ? OR LOWER(content) LIKE ?)
        ORDER BY publish_date DESC, id DESC
        LIMIT ?
        "#,
        NEWS_SELECT
    );

    sqlx::query_as::<_, News>(&sql)
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(limit.map_or(i64::MAX, |limit| limit as i64))
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn fetch_visible_promotions(
    pool: &MySqlPool,
    now: NaiveDateTime,
    term: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<Promotion>, AppError> {
    let pattern = term.map(like_pattern);
    let sql = format!(
        r#"{}
        WHERE is_active = TRUE AND end_date >= ?
          AND (? IS NULL OR LOWER(title) LIKE ? OR LOWER(description) LIKE ?)
        ORDER BY start_date DESC, id DESC
        LIMIT ?
        "#,
        PROMOTION_SELECT
    );

    sqlx::query_as::<_, Promotion>(&sql)
        .bind(now)
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .bind(limit.map_or(i64::MAX, |limit| limit as i64))
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

impl MemoryStore {
    fn published_news(&self, term: Option<&str>, limit: Option<usize>) -> Result<Vec<News>, AppError> {
        self.read(|tables| {
            let mut news: Vec<News> = tables
                .news
                .values()
                .filter(|news| news.is_publicly_visible())
                .filter(|news| {
                    term.map_or(true, |term| {
                        text_contains(&news.title, term) || text_contains(&news.content, term)
                    })
                })
                .cloned()
                .collect();
            news.sort_by(|a, b| b.publish_date.cmp(&a.publish_date).then(b.id.cmp(&a.id)));
            news.truncate(limit.unwrap_or(usize::MAX));
            news
        })
    }

    fn promotions(
        &self,
        keep: impl Fn(&Promotion) -> bool,
        limit: Option<usize>,
    ) -> Result<Vec<Promotion>, AppError> {
        self.read(|tables| {
            let mut promotions: Vec<Promotion> = tables
                .promotions
                .values()
                .filter(|promotion| keep(promotion))
                .cloned()
                .collect();
            promotions.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
            promotions.truncate(limit.unwrap_or(usize::MAX));
            promotions
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn news(title: &str, is_published: bool, age_days: i64) -> NewNews {
        let date = Utc::now().naive_utc() - Duration::days(age_days);
        NewNews {
            title: title.to_string(),
            content: "Campus update".to_string(),
            image_url: None,
            created_date: date,
            publish_date: Some(date),
            is_published,
            author: Some("Administrator".to_string()),
        }
    }

    #[actix_web::test]
    async fn only_published_news_is_public_and_latest_first() {
        let store = Store::in_memory();
        store.create_news(&news("old", true, 5)).await.unwrap();
        store.create_news(&news("draft", false, 1)).await.unwrap();
        store.create_news(&news("fresh", true, 0)).await.unwrap();

        let titles: Vec<String> = store
            .list_published_news(Some(1))
            .await
            .unwrap()
            .into_iter()
            .map(|news| news.title)
            .collect();
        assert_eq!(titles, vec!["fresh".to_string()]);
        assert_eq!(store.list_news().await.unwrap().len(), 3);
        assert!(store.search_published_news("draft").await.unwrap().is_empty());
        assert_eq!(store.search_published_news("CAMPUS").await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn expired_and_inactive_promotions_are_hidden() {
        let store = Store::in_memory();
        let now = Utc::now().naive_utc();
        let promotion = |title: &str, is_active: bool, end: NaiveDateTime| NewPromotion {
            title: title.to_string(),
            description: "Library discount".to_string(),
            start_date: now - Duration::days(30),
            end_date: end,
            image_url: None,
            is_active,
            discount: None,
        };
        store
            .create_promotion(&promotion("live", true, now + Duration::days(1)))
            .await
            .unwrap();
        store
            .create_promotion(&promotion("expired", true, now - Duration::days(1)))
            .await
            .unwrap();
        store
            .create_promotion(&promotion("paused", false, now + Duration::days(1)))
            .await
            .unwrap();

        let visible = store.list_visible_promotions(now, None).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "live");
        assert_eq!(store.list_promotions().await.unwrap().len(), 3);
    }
}
