use sea_orm::{ActiveValue, IntoActiveModel, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ErrorCode, Money, Page, PageRequest, ResultEngine, Role, User, UserNew, UserPatch,
    users,
    util::{normalize_optional_text, normalize_username},
};

use super::{Engine, with_tx};

fn check_balance(balance: Money) -> ResultEngine<Money> {
    if balance.is_negative() {
        return Err(EngineError::invalid_input(
            "balance",
            "must not be negative",
        ));
    }
    Ok(balance)
}

impl users::Repo {
    async fn find_by_username<C>(db: &C, username: &str) -> ResultEngine<Option<users::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::not_deleted()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?)
    }

    pub(super) async fn require<C>(db: &C, id: i64) -> ResultEngine<users::Model>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id_not_deleted(db, id)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::UserNotFound))
    }

    /// Live user `caller_id`; `USER_NOT_ADMIN` unless it holds the ADMIN role.
    pub(super) async fn require_admin<C>(db: &C, caller_id: i64) -> ResultEngine<users::Model>
    where
        C: ConnectionTrait,
    {
        let caller = Self::require(db, caller_id).await?;
        if Role::try_from(caller.role.as_str())? != Role::Admin {
            return Err(EngineError::user_not_admin(&caller.username));
        }
        Ok(caller)
    }
}

impl Engine {
    /// Create a user. Usernames are unique among live users.
    pub async fn create_user(&self, cmd: UserNew, actor: &str) -> ResultEngine<User> {
        let username = normalize_username(&cmd.username)?;
        let full_name = normalize_optional_text(cmd.full_name.as_deref());
        let balance = check_balance(cmd.balance)?;
        with_tx!(self, |db_tx| {
            if users::Repo::find_by_username(&db_tx, &username)
                .await?
                .is_some()
            {
                return Err(EngineError::user_exists(&username));
            }

            let active = users::ActiveModel {
                username: ActiveValue::Set(username),
                full_name: ActiveValue::Set(full_name),
                balance: ActiveValue::Set(balance.cents()),
                role: ActiveValue::Set(cmd.role.as_str().to_string()),
                ..Default::default()
            };
            let model = users::Repo::insert(&db_tx, active, actor).await?;
            tracing::info!(user_id = model.id, role = %model.role, "user created");
            User::try_from(model)
        })
    }

    pub async fn user(&self, id: i64) -> ResultEngine<User> {
        User::try_from(users::Repo::require(&self.database, id).await?)
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        let username = normalize_username(username)?;
        let model = users::Repo::find_by_username(&self.database, &username)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::UserNotFound))?;
        User::try_from(model)
    }

    pub async fn list_users(&self, page: &PageRequest) -> ResultEngine<Page<User>> {
        users::Repo::find_all_not_deleted_page(&self.database, page)
            .await?
            .try_map(User::try_from)
    }

    /// Apply a partial update; absent fields keep their stored value.
    pub async fn update_user(&self, id: i64, patch: UserPatch, actor: &str) -> ResultEngine<User> {
        let username = patch
            .username
            .as_deref()
            .map(normalize_username)
            .transpose()?;
        let balance = patch.balance.map(check_balance).transpose()?;
        with_tx!(self, |db_tx| {
            let model = users::Repo::require(&db_tx, id).await?;

            if let Some(username) = &username
                && let Some(other) = users::Repo::find_by_username(&db_tx, username).await?
                && other.id != id
            {
                return Err(EngineError::user_exists(username));
            }

            let mut active = model.into_active_model();
            if let Some(username) = username {
                active.username = ActiveValue::Set(username);
            }
            if let Some(full_name) = patch.full_name {
                active.full_name = ActiveValue::Set(normalize_optional_text(Some(&full_name)));
            }
            if let Some(role) = patch.role {
                active.role = ActiveValue::Set(role.as_str().to_string());
            }
            if let Some(balance) = balance {
                tracing::info!(user_id = id, balance = %balance, "administrative balance update");
                active.balance = ActiveValue::Set(balance.cents());
            }
            let model = users::Repo::update(&db_tx, active, actor).await?;
            User::try_from(model)
        })
    }

    /// Trash a user. Their sales and payments stay in place and keep
    /// referencing the trashed row.
    pub async fn delete_user(&self, id: i64, actor: &str) -> ResultEngine<()> {
        users::Repo::trash(&self.database, id, actor)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::UserNotFound))?;
        tracing::info!(user_id = id, "user trashed");
        Ok(())
    }
}
