use crate::models::{
    Admin, Category, CreateRestaurantRequest, CreateUserRequest, PAGE_SIZE, Page, Restaurant,
    UpdateRestaurantRequest, UpdateUserRequest, User,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers and the
/// identity extractors talk to this trait, never to the pool directly, so the
/// data-access boundary is explicit and every consumer can be tested against a
/// mock implementation.
///
/// Every method is a single round trip (or one transaction) against the current
/// database state; nothing is cached between requests.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Categories ---
    /// Keyword-filtered, paginated listing. `None` keyword lists everything.
    async fn list_categories(
        &self,
        keyword: Option<String>,
        page: i64,
    ) -> Result<Page<Category>, sqlx::Error>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, sqlx::Error>;
    async fn create_category(&self, name: String) -> Result<Category, sqlx::Error>;
    /// Returns `None` when the id resolves to no row; no new identifier is issued.
    async fn update_category(&self, id: i64, name: String)
    -> Result<Option<Category>, sqlx::Error>;
    /// Returns false when the id resolves to no row (nothing deleted).
    async fn delete_category(&self, id: i64) -> Result<bool, sqlx::Error>;
    /// The explicit many-to-many accessor: restaurants currently associated
    /// with the category through the join table, newest association first.
    async fn restaurants_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<Restaurant>, sqlx::Error>;

    // --- Restaurants ---
    async fn list_restaurants(
        &self,
        keyword: Option<String>,
        page: i64,
    ) -> Result<Page<Restaurant>, sqlx::Error>;
    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>, sqlx::Error>;
    /// Inserts the row and its category associations in one transaction.
    async fn create_restaurant(
        &self,
        req: CreateRestaurantRequest,
    ) -> Result<Restaurant, sqlx::Error>;
    /// Full-row update plus a wholesale replacement of the category associations.
    async fn update_restaurant(
        &self,
        id: i64,
        req: UpdateRestaurantRequest,
    ) -> Result<Option<Restaurant>, sqlx::Error>;
    async fn delete_restaurant(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Users ---
    /// Keyword matches on name or email.
    async fn list_users(
        &self,
        keyword: Option<String>,
        page: i64,
    ) -> Result<Page<User>, sqlx::Error>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    /// The caller supplies the already-hashed password; plaintext never reaches
    /// the repository.
    async fn create_user(
        &self,
        req: CreateUserRequest,
        password_hash: String,
    ) -> Result<User, sqlx::Error>;
    /// `password_hash` of `None` keeps the stored hash.
    async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Admins ---
    async fn find_admin(&self, id: i64) -> Result<Option<Admin>, sqlx::Error>;
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// Column lists reused across the query strings below. Kept as constants so a
// schema change only has to be reflected once per table.
const CATEGORY_COLUMNS: &str = "id, name, created_at, updated_at";
const RESTAURANT_COLUMNS: &str = "id, name, description, lowest_price, highest_price, \
     postal_code, address, opening_time, closing_time, seating_capacity, created_at, updated_at";
const USER_COLUMNS: &str =
    "id, email, password, name, postal_code, address, phone_number, created_at, updated_at";
const ADMIN_COLUMNS: &str = "id, email, password, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Keyword search uses QueryBuilder with bound parameters throughout; the
/// keyword is never interpolated into SQL text.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- CATEGORIES ---

    /// list_categories
    ///
    /// Two queries per call: the full match count and the requested slice.
    /// The count is taken from the same predicate, so `total` always reflects
    /// the unpaginated result set.
    async fn list_categories(
        &self,
        keyword: Option<String>,
        page: i64,
    ) -> Result<Page<Category>, sqlx::Error> {
        let page = page.max(1);

        let mut count: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM categories");
        let mut select: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {CATEGORY_COLUMNS} FROM categories"));

        if let Some(k) = &keyword {
            let pattern = format!("%{}%", k);
            count.push(" WHERE name ILIKE ");
            count.push_bind(pattern.clone());
            select.push(" WHERE name ILIKE ");
            select.push_bind(pattern);
        }

        select.push(" ORDER BY id ASC LIMIT ");
        select.push_bind(PAGE_SIZE);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * PAGE_SIZE);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let items = select
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            page,
            per_page: PAGE_SIZE,
            keyword,
        })
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_category(&self, name: String) -> Result<Category, sqlx::Error> {
        let sql = format!("INSERT INTO categories (name) VALUES ($1) RETURNING {CATEGORY_COLUMNS}");
        sqlx::query_as::<_, Category>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    /// update_category
    ///
    /// In-place mutation; `RETURNING` doubles as the existence check, so a
    /// missing row comes back as `None` without a separate lookup.
    async fn update_category(
        &self,
        id: i64,
        name: String,
    ) -> Result<Option<Category>, sqlx::Error> {
        let sql = format!(
            "UPDATE categories SET name = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_category(&self, id: i64) -> Result<bool, sqlx::Error> {
        // Join rows vanish with the category via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// restaurants_for_category
    ///
    /// The join-table traversal, spelled out as one query so the data-access
    /// cost is visible instead of hidden behind lazy relationship loading.
    async fn restaurants_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            "SELECT r.id, r.name, r.description, r.lowest_price, r.highest_price, \
                    r.postal_code, r.address, r.opening_time, r.closing_time, \
                    r.seating_capacity, r.created_at, r.updated_at \
             FROM restaurants r \
             JOIN category_restaurant cr ON cr.restaurant_id = r.id \
             WHERE cr.category_id = $1 \
             ORDER BY cr.created_at DESC, r.id DESC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
    }

    // --- RESTAURANTS ---

    async fn list_restaurants(
        &self,
        keyword: Option<String>,
        page: i64,
    ) -> Result<Page<Restaurant>, sqlx::Error> {
        let page = page.max(1);

        let mut count: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM restaurants");
        let mut select: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants"));

        if let Some(k) = &keyword {
            let pattern = format!("%{}%", k);
            count.push(" WHERE name ILIKE ");
            count.push_bind(pattern.clone());
            select.push(" WHERE name ILIKE ");
            select.push_bind(pattern);
        }

        select.push(" ORDER BY id ASC LIMIT ");
        select.push_bind(PAGE_SIZE);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * PAGE_SIZE);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let items = select
            .build_query_as::<Restaurant>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            total,
            page,
            per_page: PAGE_SIZE,
            keyword,
        })
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<Restaurant>, sqlx::Error> {
        let sql = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1");
        sqlx::query_as::<_, Restaurant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// create_restaurant
    ///
    /// Row insert and category association in a single transaction; a failure
    /// on either side leaves no partial state behind.
    async fn create_restaurant(
        &self,
        req: CreateRestaurantRequest,
    ) -> Result<Restaurant, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO restaurants \
                (name, description, lowest_price, highest_price, postal_code, address, \
                 opening_time, closing_time, seating_capacity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {RESTAURANT_COLUMNS}"
        );
        let restaurant = sqlx::query_as::<_, Restaurant>(&sql)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.lowest_price)
            .bind(req.highest_price)
            .bind(&req.postal_code)
            .bind(&req.address)
            .bind(req.opening_time)
            .bind(req.closing_time)
            .bind(req.seating_capacity)
            .fetch_one(&mut *tx)
            .await?;

        for category_id in &req.category_ids {
            sqlx::query(
                "INSERT INTO category_restaurant (restaurant_id, category_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(restaurant.id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(restaurant)
    }

    /// update_restaurant
    ///
    /// Full-row update, then the association sync: existing join rows are
    /// dropped and the submitted set is inserted fresh. Returns `None` without
    /// touching the join table when the id resolves to no row.
    async fn update_restaurant(
        &self,
        id: i64,
        req: UpdateRestaurantRequest,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE restaurants SET \
                name = $2, description = $3, lowest_price = $4, highest_price = $5, \
                postal_code = $6, address = $7, opening_time = $8, closing_time = $9, \
                seating_capacity = $10, updated_at = NOW() \
             WHERE id = $1 RETURNING {RESTAURANT_COLUMNS}"
        );
        let Some(restaurant) = sqlx::query_as::<_, Restaurant>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.lowest_price)
            .bind(req.highest_price)
            .bind(&req.postal_code)
            .bind(&req.address)
            .bind(req.opening_time)
            .bind(req.closing_time)
            .bind(req.seating_capacity)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM category_restaurant WHERE restaurant_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for category_id in &req.category_ids {
            sqlx::query(
                "INSERT INTO category_restaurant (restaurant_id, category_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(restaurant))
    }

    async fn delete_restaurant(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- USERS ---

    /// list_users
    ///
    /// Same paging contract as the other listings; the keyword matches either
    /// the display name or the email address.
    async fn list_users(
        &self,
        keyword: Option<String>,
        page: i64,
    ) -> Result<Page<User>, sqlx::Error> {
        let page = page.max(1);

        let mut count: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users");
        let mut select: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));

        if let Some(k) = &keyword {
            let pattern = format!("%{}%", k);
            count.push(" WHERE (name ILIKE ");
            count.push_bind(pattern.clone());
            count.push(" OR email ILIKE ");
            count.push_bind(pattern.clone());
            count.push(")");
            select.push(" WHERE (name ILIKE ");
            select.push_bind(pattern.clone());
            select.push(" OR email ILIKE ");
            select.push_bind(pattern);
            select.push(")");
        }

        select.push(" ORDER BY id ASC LIMIT ");
        select.push_bind(PAGE_SIZE);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * PAGE_SIZE);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let items = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page,
            per_page: PAGE_SIZE,
            keyword,
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_user(
        &self,
        req: CreateUserRequest,
        password_hash: String,
    ) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (email, password, name, postal_code, address, phone_number) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&req.email)
            .bind(password_hash)
            .bind(&req.name)
            .bind(&req.postal_code)
            .bind(&req.address)
            .bind(&req.phone_number)
            .fetch_one(&self.pool)
            .await
    }

    /// update_user
    ///
    /// COALESCE keeps the stored hash when no replacement password was supplied.
    async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "UPDATE users SET \
                email = $2, name = $3, postal_code = $4, address = $5, phone_number = $6, \
                password = COALESCE($7, password), updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&req.email)
            .bind(&req.name)
            .bind(&req.postal_code)
            .bind(&req.address)
            .bind(&req.phone_number)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- ADMINS ---

    async fn find_admin(&self, id: i64) -> Result<Option<Admin>, sqlx::Error> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1");
        sqlx::query_as::<_, Admin>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1");
        sqlx::query_as::<_, Admin>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }
}
