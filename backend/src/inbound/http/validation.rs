//! Path and query parameter validation shared by the handlers.

use serde_json::json;

use crate::domain::{
    ChapterKey, CourseKey, DocumentId, Error, FileField, FileName, HomeworkKey, LessonKey,
    PercentField, ProgressView,
};

/// Validation error codes placed in error `details`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    InvalidId,
    InvalidFileName,
    UnknownField,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::InvalidFileName => "invalid_file_name",
            Self::UnknownField => "unknown_field",
        }
    }
}

/// Name of the offending request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParamName(&'static str);

impl ParamName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

fn rejection(param: ParamName, code: ValidationCode, value: &str, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": param.0,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_id(value: &str, param: ParamName) -> Result<DocumentId, Error> {
    DocumentId::new(value).map_err(|err| {
        rejection(
            param,
            ValidationCode::InvalidId,
            value,
            format!("{}: {err}", param.0),
        )
    })
}

pub(crate) fn parse_file_name(value: &str) -> Result<FileName, Error> {
    FileName::new(value).map_err(|err| {
        rejection(
            ParamName::new("name"),
            ValidationCode::InvalidFileName,
            value,
            err.to_string(),
        )
    })
}

pub(crate) fn parse_file_field(value: &str) -> Result<FileField, Error> {
    value.parse().map_err(|_| {
        rejection(
            ParamName::new("field"),
            ValidationCode::UnknownField,
            value,
            format!("unknown file field `{value}`"),
        )
    })
}

pub(crate) fn parse_percent_field(value: &str) -> Result<PercentField, Error> {
    value.parse().map_err(|_| {
        rejection(
            ParamName::new("field"),
            ValidationCode::UnknownField,
            value,
            format!("unknown percentage field `{value}`"),
        )
    })
}

pub(crate) fn parse_view(value: &str) -> Result<ProgressView, Error> {
    serde_json::from_value(json!(value)).map_err(|_| {
        rejection(
            ParamName::new("view"),
            ValidationCode::UnknownField,
            value,
            format!("unknown view `{value}`"),
        )
    })
}

const COURSE: ParamName = ParamName::new("courseId");
const CHAPTER: ParamName = ParamName::new("chapterId");
const LESSON: ParamName = ParamName::new("lessonId");
const HOMEWORK: ParamName = ParamName::new("homeworkId");

pub(crate) fn course_key(course: &str) -> Result<CourseKey, Error> {
    Ok(CourseKey::new(parse_id(course, COURSE)?))
}

pub(crate) fn chapter_key((course, chapter): (&str, &str)) -> Result<ChapterKey, Error> {
    Ok(ChapterKey::new(
        parse_id(course, COURSE)?,
        parse_id(chapter, CHAPTER)?,
    ))
}

pub(crate) fn lesson_key((course, chapter, lesson): (&str, &str, &str)) -> Result<LessonKey, Error> {
    Ok(LessonKey::new(
        parse_id(course, COURSE)?,
        parse_id(chapter, CHAPTER)?,
        parse_id(lesson, LESSON)?,
    ))
}

pub(crate) fn homework_key(
    (course, chapter, lesson, homework): (&str, &str, &str, &str),
) -> Result<HomeworkKey, Error> {
    Ok(lesson_key((course, chapter, lesson))?.homework(parse_id(homework, HOMEWORK)?))
}
