use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// Window a summary is computed over. Dates are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    /// Today as the store's own clock sees it.
    Today,
    Between { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportRangeQuery {
    /// First day, `YYYY-MM-DD`.
    pub start_date: Option<NaiveDate>,
    /// Last day, `YYYY-MM-DD`, inclusive.
    pub end_date: Option<NaiveDate>,
}

impl ReportRangeQuery {
    pub fn into_range(self) -> AppResult<ReportRange> {
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return Err(AppError::validation("start_date and end_date are required"));
        };
        if start > end {
            return Err(AppError::validation(
                "start_date must not be after end_date",
            ));
        }
        Ok(ReportRange::Between { start, end })
    }
}
