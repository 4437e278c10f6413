use crate::PageId;
use serde::Serialize;
use std::fs;
use std::io;
use std::ops::Index;
use std::path::Path;

/// `ReferenceSequence` is the ordered stream of page identifiers a simulation services. Once
/// parsed it is never edited; a new input text always produces a wholly new sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceSequence(Vec<PageId>);

impl ReferenceSequence {
    /// Parse a raw reference string into a sequence of page identifiers. Tokens are separated by
    /// commas and/or whitespace and empty tokens are discarded.
    ///
    /// Parsing is all-or-nothing: should any token fail to parse as a base-10 integer, the result
    /// is the empty sequence rather than the tokens which happened to parse.
    ///
    /// # Arguments
    ///
    /// * `text` - raw reference string, e.g. `"7, 0, 1, 2"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use page_replacement_sim::reference::ReferenceSequence;
    /// assert_eq!(ReferenceSequence::parse("1,2 3").as_slice(), &[1, 2, 3]);
    /// assert!(ReferenceSequence::parse("1,2,x,3").is_empty());
    /// ```
    pub fn parse(text: &str) -> Self {
        let parsed: Result<Vec<PageId>, _> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::parse::<PageId>)
            .collect();

        match parsed {
            Ok(pages) => Self(pages),
            Err(_) => Self::default(),
        }
    }

    /// Read the whole file at `path` and parse its content as a reference string. The file may
    /// spread references across as many lines as it likes.
    ///
    /// # Errors
    ///
    /// Fails only when the file cannot be read. Malformed content still degrades to the empty
    /// sequence.
    pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[PageId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageId> {
        self.0.iter()
    }
}

impl From<Vec<PageId>> for ReferenceSequence {
    fn from(pages: Vec<PageId>) -> Self {
        Self(pages)
    }
}

impl Index<usize> for ReferenceSequence {
    type Output = PageId;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a ReferenceSequence {
    type Item = &'a PageId;
    type IntoIter = std::slice::Iter<'a, PageId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|page| page.to_string())
            .collect::<Vec<String>>()
            .join(",");
        write!(f, "{}", joined)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[cfg(test)]
    mod reference_sequence_tests {

        use super::*;
        use std::io::Write;

        #[test]
        fn parse_commas() {
            let sequence = ReferenceSequence::parse("7,0,1,2,0");
            assert_eq!(sequence.as_slice(), &[7, 0, 1, 2, 0]);
        }

        #[test]
        fn parse_mixed_separators() {
            let sequence = ReferenceSequence::parse(" 1, 2\t3\n4,,5 ,");
            assert_eq!(sequence.as_slice(), &[1, 2, 3, 4, 5]);
        }

        #[test]
        fn parse_keeps_duplicates_and_signs() {
            let sequence = ReferenceSequence::parse("3 3 -1 +4");
            assert_eq!(sequence.as_slice(), &[3, 3, -1, 4]);
        }

        #[test]
        fn parse_all_or_nothing() {
            assert!(ReferenceSequence::parse("1,2,x,3").is_empty());
            assert!(ReferenceSequence::parse("1;2").is_empty());
            assert!(ReferenceSequence::parse("1.5").is_empty());
        }

        #[test]
        fn parse_empty() {
            assert!(ReferenceSequence::parse("").is_empty());
            assert!(ReferenceSequence::parse(" , ,\n").is_empty());
        }

        #[test]
        fn display() {
            let sequence = ReferenceSequence::from(vec![1, 2, 3]);
            assert_eq!(sequence.to_string(), "1,2,3");
        }

        #[test]
        fn read_file() {
            let path = std::env::temp_dir().join("page_replacement_sim_read_file.txt");
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "1,2,3").unwrap();
            writeln!(file, "4 5").unwrap();
            drop(file);

            let sequence = ReferenceSequence::read_file(&path).unwrap();
            assert_eq!(sequence.as_slice(), &[1, 2, 3, 4, 5]);
            fs::remove_file(&path).unwrap();
        }

        #[test]
        fn read_file_missing() {
            let path = std::env::temp_dir().join("page_replacement_sim_does_not_exist.txt");
            assert!(ReferenceSequence::read_file(path).is_err());
        }
    }
}
