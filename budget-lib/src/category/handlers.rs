use super::view::{totals, CategoryDetailView, CategoryListView, TransactionFilters};
use super::{CategoryForm, DeleteForm, IndexQuery, ShowQuery};
use crate::error::HandlerError;
use crate::flash::{self, Notice};
use crate::user::UserId;
use actix_web::http::header;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use budget_repo::category_repo::{CategoryRepo, CategoryRepoError};
use budget_repo::transaction_repo::TransactionRepo;
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const LISTING: &str = "/categories";

fn redirect(location: &str, notice: Notice) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(notice.cookie())
        .finish()
}

/// The `Referer` as a path on this host. Referers pointing at other hosts are dropped.
fn local_referer(req: &HttpRequest) -> Option<String> {
    let referer = req.headers().get(header::REFERER)?.to_str().ok()?;
    let path = match referer.split_once("://") {
        Some((scheme, rest)) => {
            if scheme != "http" && scheme != "https" {
                return None;
            }
            let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
            if authority != req.connection_info().host() {
                return None;
            }
            if path.is_empty() {
                "/"
            } else {
                path
            }
        }
        None => referer,
    };

    if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') {
        Some(path.to_owned())
    } else {
        None
    }
}

/// Renders a page, consuming the pending flash notice.
fn page<T: serde::Serialize>(req: &HttpRequest, view: &T) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if req.cookie(flash::FLASH_COOKIE).is_some() {
        response.cookie(flash::removal_cookie());
    }
    response.json(view)
}

#[get("")]
pub async fn index(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<IndexQuery>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let categories = category_repo.get_categories(&user_id).await?;

    let editable_category = match query.editable_id() {
        Some(id) => match category_repo.get_category(&user_id, id).await {
            Ok(category) => Some(category),
            Err(CategoryRepoError::CategoryNotFound(_)) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let view = CategoryListView {
        categories,
        editable_category,
        flash: flash::read(&req),
    };
    Ok(page(&req, &view))
}

#[get("/{category_id}")]
pub async fn show(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
    query: web::Query<ShowQuery>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let category = category_repo
        .get_category(&user_id, category_id.into_inner())
        .await?;

    let filters = TransactionFilters::resolve(query.into_inner(), Local::now().date_naive());
    let transactions = transaction_repo
        .get_all_transactions(&user_id, filters.to_filter(category.id))
        .await?;
    let totals = totals(&transactions);

    let view = CategoryDetailView {
        category,
        transactions,
        year: filters.year,
        start_date: filters.start_date,
        end_date: filters.end_date,
        query: filters.query,
        income_total: totals.income,
        spending_total: totals.spending,
        flash: flash::read(&req),
    };
    Ok(page(&req, &view))
}

#[post("")]
pub async fn store(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    form: web::Form<CategoryForm>,
) -> Result<impl Responder, HandlerError> {
    let form = form.into_inner();
    form.validate()?;

    let category = category_repo
        .create_category(&user_id.into_inner(), form.into_new_category())
        .await?;
    info!(category_id = category.id, "Created category");

    Ok(redirect(LISTING, Notice::CategoryCreated))
}

#[put("/{category_id}")]
pub async fn update(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
    form: web::Form<CategoryForm>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let category = category_repo
        .get_category(&user_id, category_id.into_inner())
        .await?;

    let form = form.into_inner();
    form.validate()?;

    category_repo
        .update_category(&user_id, category.id, form.into_new_category())
        .await?;

    Ok(redirect(LISTING, Notice::CategoryUpdated))
}

#[delete("/{category_id}")]
pub async fn destroy(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
    form: web::Form<DeleteForm>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    let category = category_repo
        .get_category(&user_id, category_id.into_inner())
        .await?;

    let deleted = if form.confirms(category.id) {
        match category_repo.delete_category(&user_id, category.id).await {
            Ok(_) => true,
            Err(CategoryRepoError::CategoryInUse(_)) => false,
            Err(e) => return Err(e.into()),
        }
    } else {
        false
    };

    if deleted {
        info!(category_id = category.id, "Deleted category");
        return Ok(redirect(LISTING, Notice::CategoryDeleted));
    }

    warn!(category_id = category.id, "Category not deleted");
    let back = local_referer(&req).unwrap_or_else(|| format!("{}/{}", LISTING, category.id));
    Ok(redirect(&back, Notice::CategoryUndeleted))
}
