use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Chapter, Verse};

const VERSE_COLUMNS: &str = "id, book_id, chapter, verse, text";

fn verse_from_row(row: &Row<'_>) -> rusqlite::Result<Verse> {
    Ok(Verse {
        id: row.get(0)?,
        book_id: row.get(1)?,
        chapter: row.get(2)?,
        verse: row.get(3)?,
        text: row.get(4)?,
    })
}

/// Verses of one chapter ordered by verse number. An unknown book or chapter
/// yields an empty list.
pub fn fetch_chapter_verses(
    conn: &Connection,
    book_id: i64,
    chapter: i64,
) -> rusqlite::Result<Vec<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VERSE_COLUMNS} FROM verse
         WHERE book_id = ?1 AND chapter = ?2
         ORDER BY verse ASC"
    ))?;
    let verses = stmt
        .query_map(params![book_id, chapter], verse_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(verses)
}

pub fn verse_at(
    conn: &Connection,
    book_id: i64,
    chapter: i64,
    verse: i64,
) -> rusqlite::Result<Option<Verse>> {
    conn.query_row(
        &format!(
            "SELECT {VERSE_COLUMNS} FROM verse
             WHERE book_id = ?1 AND chapter = ?2 AND verse = ?3"
        ),
        params![book_id, chapter, verse],
        verse_from_row,
    )
    .optional()
}

/// Every verse of a book ordered by chapter then verse.
pub fn fetch_book_verses(conn: &Connection, book_id: i64) -> rusqlite::Result<Vec<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VERSE_COLUMNS} FROM verse
         WHERE book_id = ?1
         ORDER BY chapter ASC, verse ASC"
    ))?;
    let verses = stmt
        .query_map(params![book_id], verse_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(verses)
}

/// Distinct chapter numbers present for a book, ascending.
pub fn fetch_chapter_numbers(conn: &Connection, book_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT chapter FROM verse WHERE book_id = ?1 ORDER BY chapter ASC",
    )?;
    let chapters = stmt
        .query_map(params![book_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(chapters)
}

/// Group verses already sorted by (chapter, verse) into chapters. Unsorted
/// input produces one chapter per run of equal chapter numbers.
pub fn group_into_chapters(verses: Vec<Verse>) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();
    for verse in verses {
        match chapters.last_mut() {
            Some(current) if current.number == verse.chapter && current.book_id == verse.book_id => {
                current.verses.push(verse);
            }
            _ => chapters.push(Chapter {
                book_id: verse.book_id,
                number: verse.chapter,
                verses: vec![verse],
            }),
        }
    }
    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(id: i64, chapter: i64, number: i64) -> Verse {
        Verse {
            id,
            book_id: 1,
            chapter,
            verse: number,
            text: format!("{chapter}:{number}"),
        }
    }

    #[test]
    fn groups_consecutive_chapters() {
        let chapters = group_into_chapters(vec![
            verse(1, 1, 1),
            verse(2, 1, 2),
            verse(3, 2, 1),
            verse(4, 3, 1),
            verse(5, 3, 2),
        ]);
        let shape: Vec<(i64, usize)> = chapters.iter().map(|c| (c.number, c.verses.len())).collect();
        assert_eq!(shape, vec![(1, 2), (2, 1), (3, 2)]);
    }

    #[test]
    fn empty_input_has_no_chapters() {
        assert!(group_into_chapters(Vec::new()).is_empty());
    }
}
