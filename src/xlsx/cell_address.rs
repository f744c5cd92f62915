use crate::common::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    // Parses A1 notation (for example: B3, AA10, $C$7) into zero-based indexes.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        if input.trim().is_empty() {
            return Err(AppError::InvalidCellAddress("address is empty".to_string()));
        }

        let mut letters = String::new();
        let mut digits = String::new();
        for ch in input.trim().chars() {
            if ch == '$' {
                continue;
            }
            if ch.is_ascii_alphabetic() {
                if !digits.is_empty() {
                    return Err(AppError::InvalidCellAddress(input.to_string()));
                }
                letters.push(ch.to_ascii_uppercase());
            } else if ch.is_ascii_digit() {
                digits.push(ch);
            } else {
                return Err(AppError::InvalidCellAddress(input.to_string()));
            }
        }

        if letters.is_empty() || digits.is_empty() || letters.len() > 3 {
            return Err(AppError::InvalidCellAddress(input.to_string()));
        }

        let col = letters
            .chars()
            .fold(0usize, |acc, c| acc * 26 + ((c as u8 - b'A') as usize + 1));
        let row_num: usize = digits
            .parse()
            .map_err(|_| AppError::InvalidCellAddress(input.to_string()))?;

        if row_num == 0 || col == 0 {
            return Err(AppError::InvalidCellAddress(input.to_string()));
        }

        Ok(Self {
            row: row_num - 1,
            col: col - 1,
        })
    }

    pub fn column_letters(self) -> String {
        // Converts zero-based column index back to base-26 spreadsheet letters.
        let mut col = self.col + 1;
        let mut letters = String::new();
        while col > 0 {
            let rem = (col - 1) % 26;
            letters.insert(0, (b'A' + rem as u8) as char);
            col = (col - 1) / 26;
        }
        letters
    }

    pub fn to_a1(self) -> String {
        format!("{}{}", self.column_letters(), self.row + 1)
    }
}

impl CellRange {
    // Accepts "B2:K2" as well as a single-cell "B2".
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let (first, last) = match input.split_once(':') {
            Some((first, last)) => (first, last),
            None => (input, input),
        };
        let a = CellAddress::parse(first)?;
        let b = CellAddress::parse(last)?;
        Ok(Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        })
    }

    pub fn contains(&self, address: CellAddress) -> bool {
        address.row >= self.start.row
            && address.row <= self.end.row
            && address.col >= self.start.col
            && address.col <= self.end.col
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }
}
